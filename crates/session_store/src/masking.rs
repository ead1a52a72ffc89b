/// Render a credential for display: first 8 and last 4 characters with an
/// ellipsis in between. Keys of 12 characters or fewer come back as the
/// ellipsis alone so a short secret is never echoed.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "…".to_string();
    }

    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
