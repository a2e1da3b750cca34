// build.rs

//! Compiles `locales/<lang>.toml` into the `t!` macro.
//!
//! English is always loaded. A `lang_<code>` feature (or `SCRIPTDECK_LANG` when no
//! feature is set) layers another locale over it, so a key the locale lacks falls
//! back to English.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

type Strings = BTreeMap<String, String>;

const FALLBACK: &str = "en";

fn main() -> Result<(), String> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales");
    println!("cargo:rerun-if-env-changed=SCRIPTDECK_LANG");

    let lang = requested_language();
    let mut strings = read_locale(FALLBACK)?;
    if lang != FALLBACK {
        match read_locale(&lang) {
            Ok(overrides) => strings.extend(overrides),
            Err(e) => println!("cargo:warning={}; using English", e),
        }
    }

    let out_dir = env::var_os("OUT_DIR").ok_or("OUT_DIR is not set")?;
    let target = PathBuf::from(out_dir).join("translations.rs");
    fs::write(&target, render(&strings))
        .map_err(|e| format!("cannot write {}: {}", target.display(), e))
}

/// A non-English language feature wins, then `lang_en`, then the environment.
fn requested_language() -> String {
    let mut features: Vec<String> = env::vars()
        .filter_map(|(key, _)| key.strip_prefix("CARGO_FEATURE_LANG_").map(str::to_lowercase))
        .collect();
    features.sort();

    if let Some(lang) = features.iter().find(|l| l.as_str() != FALLBACK) {
        if features.len() > 1 {
            println!("cargo:warning=several language features enabled, using '{}'", lang);
        }
        return lang.clone();
    }
    if !features.is_empty() {
        return FALLBACK.to_string();
    }
    env::var("SCRIPTDECK_LANG")
        .ok()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| FALLBACK.to_string())
}

fn read_locale(lang: &str) -> Result<Strings, String> {
    let path = format!("locales/{}.toml", lang);
    let text = fs::read_to_string(&path).map_err(|e| format!("cannot read {}: {}", path, e))?;
    toml::from_str(&text).map_err(|e| format!("cannot parse {}: {}", path, e))
}

/// One macro arm per key; `{:?}` turns keys and values into valid string literals.
fn render(strings: &Strings) -> String {
    let mut code = String::from(
        "/// Looks up a user-facing string at compile time. Unknown keys do not compile.\n\
         #[macro_export]\nmacro_rules! t {\n",
    );
    for (key, value) in strings {
        code.push_str(&format!("    ({:?}) => {{ {:?} }};\n", key, value));
    }
    code.push_str(
        "    ($key:expr) => { compile_error!(concat!(\"Missing translation key: \", $key)) };\n}\n",
    );
    code
}
