/// Split text into lowercase alphanumeric tokens.
///
/// Any non-alphanumeric character separates tokens. Duplicates are kept in
/// order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|t| {
            t.chars()
                .flat_map(char::to_lowercase)
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|t| !t.is_empty())
        .collect()
}
