//! Naming Inference - Alias, model and table names derived from a discriminator value
//!
//! `BankAccount` becomes the alias `bankAccountDetails`, the related model
//! `BankAccountDetails` and the table `bank_account_details`.

/// Suffix appended to every inferred alias and model name
pub const DETAILS_SUFFIX: &str = "Details";

/// Split an identifier into words on separators, camel humps and acronym boundaries
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let hump = c.is_uppercase() && (prev.is_lowercase() || prev.is_ascii_digit());
            // "HTTPServer": split before the 'S' that starts a lowercase run
            let acronym_end = c.is_uppercase()
                && prev.is_uppercase()
                && next.map(|n| n.is_lowercase()).unwrap_or(false);
            if hump || acronym_end {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Convert to camelCase
pub fn to_camel_case(s: &str) -> String {
    let words = split_words(s);
    let mut result = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            result.push_str(&word.to_lowercase());
        } else {
            result.push_str(&capitalize(word));
        }
    }
    result
}

/// Convert to PascalCase
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// Convert to snake_case
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Relation alias for a discriminator value (`BankAccount` -> `bankAccountDetails`)
pub fn alias_for(discriminator: &str) -> String {
    format!("{}{}", to_camel_case(discriminator), DETAILS_SUFFIX)
}

/// Related model name for a discriminator value (`BankAccount` -> `BankAccountDetails`)
pub fn related_model_for(discriminator: &str) -> String {
    format!("{}{}", to_pascal_case(discriminator), DETAILS_SUFFIX)
}

/// Underscored table name for a discriminator value (`BankAccount` -> `bank_account_details`)
pub fn table_for(discriminator: &str) -> String {
    to_snake_case(&related_model_for(discriminator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("BankAccount"), vec!["Bank", "Account"]);
        assert_eq!(split_words("bank_account"), vec!["bank", "account"]);
        assert_eq!(split_words("credit card"), vec!["credit", "card"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(split_words("card2Fa"), vec!["card2", "Fa"]);
        assert!(split_words("--").is_empty());
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_camel_case("BankAccount"), "bankAccount");
        assert_eq!(to_camel_case("bank_account"), "bankAccount");
        assert_eq!(to_camel_case("Card"), "card");
        assert_eq!(to_pascal_case("bank_account"), "BankAccount");
        assert_eq!(to_snake_case("BankAccountDetails"), "bank_account_details");
    }

    #[test]
    fn test_detail_naming_convention() {
        assert_eq!(alias_for("BankAccount"), "bankAccountDetails");
        assert_eq!(alias_for("Card"), "cardDetails");
        assert_eq!(related_model_for("BankAccount"), "BankAccountDetails");
        assert_eq!(related_model_for("card"), "CardDetails");
        assert_eq!(table_for("BankAccount"), "bank_account_details");
        assert_eq!(table_for("Card"), "card_details");
    }
}
