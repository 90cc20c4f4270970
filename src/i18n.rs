// i18n.rs：运行时界面文案
//
// 文案来自 assets/i18n/<lang>.json，或单文件 assets/i18n.json
// （格式 { "<lang>": { "key": "value" } }）。先查当前语言，再查 zh-Hans 兜底，
// 都没有就原样返回 key。`{name}` 占位符由 tr_with 替换。
//
// 语言选择顺序：--lang <code> -> 环境变量 REEL_LANG -> zh-Hans

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const FALLBACK_LANG: &str = "zh-Hans";
const LANG_ENV: &str = "REEL_LANG";

type Table = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
struct Catalog {
    lang: String,
    strings: Table,
    fallback: Table,
}

impl Catalog {
    fn lookup(&self, key: &str) -> Option<&String> {
        self.strings.get(key).or_else(|| self.fallback.get(key))
    }
}

static CATALOG: OnceCell<RwLock<Catalog>> = OnceCell::new();

/// 依次在 exe 同目录和工作目录下寻找 assets 里的文件
pub fn find_asset(relative: &Path) -> Option<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|d| d.join("assets")));

    exe_dir
        .into_iter()
        .chain(std::iter::once(PathBuf::from("assets")))
        .map(|root| root.join(relative))
        .find(|p| p.exists())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("ignoring malformed string table {:?}: {}", path, e);
            None
        }
    }
}

fn load_table(lang: &str) -> Table {
    let per_lang = Path::new("i18n").join(format!("{}.json", lang));
    if let Some(table) = find_asset(&per_lang).and_then(|p| read_json::<Table>(&p)) {
        return table;
    }

    find_asset(Path::new("i18n.json"))
        .and_then(|p| read_json::<HashMap<String, Table>>(&p))
        .and_then(|mut all| all.remove(lang))
        .unwrap_or_default()
}

/// (Re)load the string tables for `lang`.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let strings = load_table(&lang);
    let fallback = if lang == FALLBACK_LANG {
        strings.clone()
    } else {
        load_table(FALLBACK_LANG)
    };
    let catalog = Catalog {
        lang,
        strings,
        fallback,
    };
    log::debug!("i18n: {} ({} strings)", catalog.lang, catalog.strings.len());
    match CATALOG.get() {
        Some(lock) => {
            if let Ok(mut w) = lock.write() {
                *w = catalog;
            }
        }
        None => {
            let _ = CATALOG.set(RwLock::new(catalog));
        }
    }
}

pub fn tr(key: &str) -> String {
    CATALOG
        .get()
        .and_then(|l| l.read().ok().and_then(|c| c.lookup(key).cloned()))
        .unwrap_or_else(|| key.to_string())
}

/// 替换 `{name}` 占位符；未提供的占位符保持原样
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    args.iter().fold(tr(key), |s, (k, v)| {
        s.replace(&format!("{{{}}}", k), v)
    })
}

pub fn resolve_lang(cli: Option<&str>) -> String {
    if let Some(lang) = cli.filter(|l| !l.trim().is_empty()) {
        return lang.to_string();
    }
    match std::env::var(LANG_ENV) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => FALLBACK_LANG.to_string(),
    }
}
