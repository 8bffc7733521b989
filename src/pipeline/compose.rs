//! Multi-glyph SVG font composition.
//!
//! Every file in the merged-glyph directory whose name carries a
//! `u+<hex>` code point becomes one glyph in a single SVG font
//! document. Files without an extractable code point are not font
//! glyphs and are skipped silently. Enumeration is sorted so the
//! unicode-to-outline mapping is deterministic for a given input set;
//! when the same code point appears more than once the first file in
//! sort order wins, matching the merge policy.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ComposeError;

/// Font-level parameters of the composed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSettings {
    #[serde(default = "default_font_name")]
    pub name: String,
    #[serde(default = "default_font_height")]
    pub height: u32,
    #[serde(default)]
    pub descent: u32,
    #[serde(default = "default_preserve_aspect")]
    pub preserve_aspect: bool,
}

fn default_font_name() -> String {
    "Glyphforge".to_string()
}

fn default_font_height() -> u32 {
    1024
}

fn default_preserve_aspect() -> bool {
    true
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            name: default_font_name(),
            height: default_font_height(),
            descent: 0,
            preserve_aspect: default_preserve_aspect(),
        }
    }
}

/// What went into the composed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeReport {
    /// Code points registered, in ascending order.
    pub code_points: Vec<u32>,
    /// Files without an extractable code point, silently excluded.
    pub skipped: usize,
    /// Files whose code point was already taken by an earlier file.
    pub duplicates: usize,
}

/// Extract the Unicode scalar value encoded in a glyph file name via
/// the `u+<hex>` pattern (case-insensitive, anywhere in the name).
/// Values that are not valid scalar values yield `None`.
pub fn extract_code_point(file_name: &str) -> Option<(u32, char)> {
    let bytes = file_name.as_bytes();
    for i in 0..bytes.len().saturating_sub(2) {
        if bytes[i].eq_ignore_ascii_case(&b'u') && bytes[i + 1] == b'+' {
            let hex: String = file_name[i + 2..]
                .chars()
                .take_while(|c| c.is_ascii_hexdigit())
                .collect();
            if hex.is_empty() {
                continue;
            }
            if let Ok(value) = u32::from_str_radix(&hex, 16)
                && let Some(ch) = char::from_u32(value)
            {
                return Some((value, ch));
            }
        }
    }
    None
}

/// Pull the path data out of a vector outline document: the
/// concatenation of every `d` attribute, in document order.
fn extract_path_data(svg: &str) -> String {
    let bytes = svg.as_bytes();
    let mut parts = Vec::new();
    let mut i = 0;
    while i + 3 <= bytes.len() {
        let is_attr_start = bytes[i] == b'd'
            && i + 2 < bytes.len()
            && bytes[i + 1] == b'='
            && (bytes[i + 2] == b'"' || bytes[i + 2] == b'\'')
            && (i == 0 || bytes[i - 1].is_ascii_whitespace());
        if is_attr_start {
            let quote = bytes[i + 2] as char;
            if let Some(end) = svg[i + 3..].find(quote) {
                parts.push(svg[i + 3..i + 3 + end].trim().to_string());
                i = i + 3 + end + 1;
                continue;
            }
        }
        i += 1;
    }
    parts.join(" ")
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

fn write_err(out_path: &Path, source: std::io::Error) -> ComposeError {
    ComposeError::Write {
        path: out_path.to_path_buf(),
        source,
    }
}

fn collect_svg_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_svg_files(&path, out)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Compose every code-point-named outline under `glyph_dir` into one
/// SVG font document at `out_path`. The output is fully flushed before
/// the function returns.
pub fn compose_font(
    glyph_dir: &Path,
    out_path: &Path,
    settings: &FontSettings,
) -> Result<ComposeReport, ComposeError> {
    let mut files = Vec::new();
    collect_svg_files(glyph_dir, &mut files).map_err(|source| ComposeError::ReadDir {
        path: glyph_dir.to_path_buf(),
        source,
    })?;

    let mut report = ComposeReport::default();
    let mut glyphs: BTreeMap<u32, PathBuf> = BTreeMap::new();
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match extract_code_point(&name) {
            Some((value, _)) => {
                if glyphs.contains_key(&value) {
                    report.duplicates += 1;
                } else {
                    glyphs.insert(value, path);
                }
            }
            None => report.skipped += 1,
        }
    }

    if glyphs.is_empty() {
        return Err(ComposeError::EmptyGlyphSet(glyph_dir.to_path_buf()));
    }

    let file = fs::File::create(out_path).map_err(|source| write_err(out_path, source))?;
    let mut w = BufWriter::new(file);

    let name = escape_attr(&settings.name);
    let ascent = settings.height.saturating_sub(settings.descent);
    let descent = -(i64::from(settings.descent));
    let aspect = if settings.preserve_aspect {
        "xMidYMid meet"
    } else {
        "none"
    };

    writeln!(w, r#"<?xml version="1.0" standalone="no"?>"#)
        .map_err(|source| write_err(out_path, source))?;
    writeln!(
        w,
        r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">"#
    )
    .map_err(|source| write_err(out_path, source))?;
    writeln!(
        w,
        r#"<svg xmlns="http://www.w3.org/2000/svg" preserveAspectRatio="{aspect}">"#
    )
    .map_err(|source| write_err(out_path, source))?;
    writeln!(w, r#"<defs>"#).map_err(|source| write_err(out_path, source))?;
    writeln!(w, r#"<font id="{name}" horiz-adv-x="{}">"#, settings.height)
        .map_err(|source| write_err(out_path, source))?;
    writeln!(
        w,
        r#"<font-face font-family="{name}" units-per-em="{}" ascent="{ascent}" descent="{descent}"/>"#,
        settings.height
    )
    .map_err(|source| write_err(out_path, source))?;
    writeln!(w, r#"<missing-glyph horiz-adv-x="{}"/>"#, settings.height)
        .map_err(|source| write_err(out_path, source))?;

    for (value, path) in &glyphs {
        let outline = fs::read_to_string(path).map_err(|source| ComposeError::ReadGlyph {
            path: path.clone(),
            source,
        })?;
        let d = extract_path_data(&outline);
        writeln!(
            w,
            r#"<glyph glyph-name="icon_{value:04x}" unicode="&#x{value:x};" d="{}"/>"#,
            escape_attr(&d)
        )
        .map_err(|source| write_err(out_path, source))?;
        report.code_points.push(*value);
    }

    writeln!(w, r#"</font>"#).map_err(|source| write_err(out_path, source))?;
    writeln!(w, r#"</defs>"#).map_err(|source| write_err(out_path, source))?;
    writeln!(w, r#"</svg>"#).map_err(|source| write_err(out_path, source))?;
    w.flush().map_err(|source| write_err(out_path, source))?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const OUTLINE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0 L10 10 Z"/></svg>"#;

    #[test]
    fn extracts_code_points_case_insensitively() {
        assert_eq!(extract_code_point("u+4e00.svg"), Some((0x4e00, '一')));
        assert_eq!(extract_code_point("U+4E8C.svg"), Some((0x4e8c, '二')));
        assert_eq!(extract_code_point("glyph-u+0041.svg"), Some((0x41, 'A')));
        assert_eq!(extract_code_point("notes.txt"), None);
        assert_eq!(extract_code_point("u+.svg"), None);
    }

    #[test]
    fn rejects_invalid_scalar_values() {
        // Surrogate range is not a valid Unicode scalar value.
        assert_eq!(extract_code_point("u+d800.svg"), None);
    }

    #[test]
    fn extracts_path_data_attributes() {
        let svg = r#"<svg><path d="M0 0 Z"/><path id="x" d='M1 1 Z'/></svg>"#;
        assert_eq!(extract_path_data(svg), "M0 0 Z M1 1 Z");
    }

    #[test]
    fn composes_only_pattern_matching_files() {
        let tmp = TempDir::new().unwrap();
        let merged = tmp.path().join("merged");
        fs::create_dir_all(&merged).unwrap();
        fs::write(merged.join("u+4e00.svg"), OUTLINE).unwrap();
        fs::write(merged.join("u+4e8c.svg"), OUTLINE).unwrap();
        fs::write(merged.join("notes.txt"), "not a glyph").unwrap();

        let out = tmp.path().join("font.svg");
        let report = compose_font(&merged, &out, &FontSettings::default()).unwrap();

        assert_eq!(report.code_points, vec![0x4e00, 0x4e8c]);
        assert_eq!(report.skipped, 0); // notes.txt is not an svg at all
        let doc = fs::read_to_string(&out).unwrap();
        assert!(doc.contains(r#"glyph-name="icon_4e00""#));
        assert!(doc.contains(r#"glyph-name="icon_4e8c""#));
        assert!(doc.contains(r#"unicode="&#x4e00;""#));
        assert!(!doc.contains("notes"));
    }

    #[test]
    fn svg_without_code_point_is_silently_excluded() {
        let tmp = TempDir::new().unwrap();
        let merged = tmp.path().join("merged");
        fs::create_dir_all(&merged).unwrap();
        fs::write(merged.join("u+0041.svg"), OUTLINE).unwrap();
        fs::write(merged.join("logo.svg"), OUTLINE).unwrap();

        let out = tmp.path().join("font.svg");
        let report = compose_font(&merged, &out, &FontSettings::default()).unwrap();

        assert_eq!(report.code_points, vec![0x41]);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn duplicate_code_points_keep_first_in_sort_order() {
        let tmp = TempDir::new().unwrap();
        let merged = tmp.path().join("merged");
        fs::create_dir_all(merged.join("sub")).unwrap();
        fs::write(merged.join("sub/u+0041.svg"), OUTLINE).unwrap();
        fs::write(merged.join("u+0041.svg"), OUTLINE).unwrap();

        let out = tmp.path().join("font.svg");
        let report = compose_font(&merged, &out, &FontSettings::default()).unwrap();

        assert_eq!(report.code_points, vec![0x41]);
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn empty_glyph_set_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let merged = tmp.path().join("merged");
        fs::create_dir_all(&merged).unwrap();
        fs::write(merged.join("readme.md"), "no glyphs here").unwrap();

        let out = tmp.path().join("font.svg");
        let err = compose_font(&merged, &out, &FontSettings::default()).unwrap_err();
        assert!(matches!(err, ComposeError::EmptyGlyphSet(_)));
    }

    #[test]
    fn same_input_set_yields_same_mapping() {
        let tmp = TempDir::new().unwrap();
        let merged = tmp.path().join("merged");
        fs::create_dir_all(&merged).unwrap();
        for cp in ["u+0041", "u+0042", "u+4e00"] {
            fs::write(merged.join(format!("{cp}.svg")), OUTLINE).unwrap();
        }

        let out_a = tmp.path().join("a.svg");
        let out_b = tmp.path().join("b.svg");
        let a = compose_font(&merged, &out_a, &FontSettings::default()).unwrap();
        let b = compose_font(&merged, &out_b, &FontSettings::default()).unwrap();

        assert_eq!(a.code_points, b.code_points);
        assert_eq!(
            fs::read_to_string(&out_a).unwrap(),
            fs::read_to_string(&out_b).unwrap()
        );
    }

    #[test]
    fn font_face_reflects_settings() {
        let tmp = TempDir::new().unwrap();
        let merged = tmp.path().join("merged");
        fs::create_dir_all(&merged).unwrap();
        fs::write(merged.join("u+0041.svg"), OUTLINE).unwrap();

        let settings = FontSettings {
            name: "My Font".into(),
            height: 2048,
            descent: 256,
            preserve_aspect: false,
        };
        let out = tmp.path().join("font.svg");
        compose_font(&merged, &out, &settings).unwrap();

        let doc = fs::read_to_string(&out).unwrap();
        assert!(doc.contains(r#"font-family="My Font""#));
        assert!(doc.contains(r#"units-per-em="2048""#));
        assert!(doc.contains(r#"ascent="1792""#));
        assert!(doc.contains(r#"descent="-256""#));
        assert!(doc.contains(r#"preserveAspectRatio="none""#));
    }
}
