//! Static knowledge about the macros the converter understands.

/// Namespace prefix the renderer puts in front of every macro name.
pub const NAME_PREFIX: &str = ":Mathe für Nicht-Freaks: Vorlage:";

/// Which parameters of a macro hold markup rather than plain values.
enum ContentParams {
    Keys(&'static [&'static str]),
    Prefix(&'static str),
}

const CONTENT_PARAMS: &[(&str, ContentParams)] = &[
    ("Definition", ContentParams::Keys(&["definition"])),
    ("Warnung", ContentParams::Keys(&["1"])),
    ("Aufgabe", ContentParams::Keys(&["aufgabe", "lösung", "beweis"])),
    ("Liste", ContentParams::Prefix("item")),
];

/// Numbered parameter families merged into `<prefix>_list`.
const LIST_PARAMS: &[(&str, &[&str])] = &[("Liste", &["item"])];

/// Whether parameter `key` of macro `template` is parsed as markup.
pub fn is_content_param(template: &str, key: &str) -> bool {
    CONTENT_PARAMS
        .iter()
        .find(|(name, _)| *name == template)
        .is_some_and(|(_, params)| match params {
            ContentParams::Keys(keys) => keys.contains(&key),
            ContentParams::Prefix(prefix) => key.starts_with(prefix),
        })
}

/// Numbered parameter prefixes declared for `template`.
pub fn list_param_prefixes(template: &str) -> &'static [&'static str] {
    LIST_PARAMS
        .iter()
        .find(|(name, _)| *name == template)
        .map_or(&[], |(_, prefixes)| *prefixes)
}

/// Strip [`NAME_PREFIX`] from a raw macro target.
pub fn macro_name(target: &str) -> &str {
    let target = target.trim();
    target.strip_prefix(NAME_PREFIX).unwrap_or(target)
}
