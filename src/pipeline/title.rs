//! Human-readable labels: slide titles from filenames and column captions
//! from folder paths.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path};

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_-]").expect("valid regex"));

/// Derive a slide title from an image filename.
///
/// The final extension is dropped, `_` and `-` become spaces, and the result
/// is title-cased word by word (`jet_pt-lead.png` → `Jet Pt Lead`).
pub fn pretty_title(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    title_case(&SEPARATORS.replace_all(&stem, " "))
}

/// Upper-case every cased character that follows an uncased one, lower-case
/// the rest. Digits and punctuation are uncased, so `2d` becomes `2D`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        let titled = titlecase_special(c);
        let cased = c.is_uppercase() || c.is_lowercase() || titled.is_some();
        if cased && !prev_cased {
            match titled {
                Some(t) => out.push_str(t),
                None => out.extend(c.to_uppercase()),
            }
        } else if cased {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev_cased = cased;
    }
    out
}

/// Characters whose titlecase form differs from their uppercase form.
/// Greek letters with a subscript iota are left to `to_uppercase`.
fn titlecase_special(c: char) -> Option<&'static str> {
    Some(match c {
        'Ǆ' | 'ǅ' | 'ǆ' => "ǅ",
        'Ǉ' | 'ǈ' | 'ǉ' => "ǈ",
        'Ǌ' | 'ǋ' | 'ǌ' => "ǋ",
        'Ǳ' | 'ǲ' | 'ǳ' => "ǲ",
        'ß' => "Ss",
        'ﬀ' => "Ff",
        'ﬁ' => "Fi",
        'ﬂ' => "Fl",
        'ﬃ' => "Ffi",
        'ﬄ' => "Ffl",
        'ﬅ' | 'ﬆ' => "St",
        'և' => "Եւ",
        'ﬓ' => "Մն",
        'ﬔ' => "Մե",
        'ﬕ' => "Մի",
        'ﬖ' => "Վն",
        'ﬗ' => "Մխ",
        _ => return None,
    })
}

/// Caption for a folder: the last two components of the normalised path.
///
/// `results/2024/run_a/` → `2024/run_a`, `plots` → `plots`, `/data` → `/data`.
pub fn folder_label(path: &Path) -> String {
    let absolute = path.has_root();
    let mut parts: Vec<String> = Vec::new();

    for comp in path.components() {
        match comp {
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if parts.last().is_some_and(|p| p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..".to_string());
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    match parts.as_slice() {
        [] if absolute => "/".to_string(),
        [] => ".".to_string(),
        [only] if absolute => format!("/{only}"),
        [only] => only.clone(),
        [.., parent, last] => format!("{parent}/{last}"),
    }
}
