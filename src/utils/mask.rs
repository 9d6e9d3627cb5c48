/// Masks delivery-point identifiers (PCE/PDL) before they reach the logs
pub fn mask_identifier(value: &str) -> String {
    let chars: Vec<char> = value.trim().chars().collect();
    let len = chars.len();

    if len == 0 {
        return String::new();
    }
    if len <= 4 {
        return "*".repeat(len);
    }

    // Keep the first 2 and last 2 characters
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[len - 2..].iter().collect();
    format!("{}{}{}", head, "*".repeat(len - 4), tail)
}
