//! Minimal English inflection for table-name matching.

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "money",
    "series",
    "species",
    "sheep",
    "fish",
    "metadata",
    "news",
];

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Split off the last `_`-separated word so `order_item` inflects `item`.
fn split_last_word(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(idx) => (&word[..=idx], &word[idx + 1..]),
        None => ("", word),
    }
}

pub fn pluralize(word: &str) -> String {
    let (prefix, last) = split_last_word(word);
    format!("{prefix}{}", pluralize_word(last))
}

pub fn singularize(word: &str) -> String {
    let (prefix, last) = split_last_word(word);
    format!("{prefix}{}", singularize_word(last))
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return plural.to_string();
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
        return word.to_string();
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{word}es");
    }
    match word.strip_suffix('y') {
        Some(stem) if stem.chars().last().is_some_and(|ch| !is_vowel(ch)) => {
            format!("{stem}ies")
        }
        _ => format!("{word}s"),
    }
}

fn singularize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == word) {
        return singular.to_string();
    }
    if IRREGULAR.iter().any(|(singular, _)| *singular == word) || word.ends_with("ss") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes", "statuses", "aliases"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralizes_common_table_names() {
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("branch"), "branches");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("order_item"), "order_items");
        assert_eq!(pluralize("equipment"), "equipment");
    }

    #[test]
    fn singularizes_common_table_names() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("branches"), "branch");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("order_items"), "order_item");
        assert_eq!(singularize("class"), "class");
        assert_eq!(singularize("houses"), "house");
    }
}
