//! URI path segments.

/// ASCII-lowercase slug: Latin diacritics folded, alphanumerics kept, every
/// other run becomes one hyphen.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    let mut ascii = [0u8; 4];

    for ch in input.chars() {
        let folded: &str = if ch.is_ascii_alphanumeric() {
            ch.to_ascii_lowercase().encode_utf8(&mut ascii)
        } else {
            fold_latin(ch)
        };
        if folded.is_empty() {
            pending_hyphen = true;
            continue;
        }
        if pending_hyphen && !slug.is_empty() {
            slug.push('-');
        }
        pending_hyphen = false;
        slug.push_str(folded);
    }
    slug
}

/// Lowercase ASCII spelling of an accented Latin letter, or "" when it has none.
fn fold_latin(ch: char) -> &'static str {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä'
        | 'Å' | 'Ā' | 'Ă' | 'Ą' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'ć' | 'č' | 'Ç' | 'Ć' | 'Č' => "c",
        'ď' | 'đ' | 'Ď' | 'Đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' | 'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė'
        | 'Ę' | 'Ě' => "e",
        'ğ' | 'Ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' | 'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' | 'İ' => "i",
        'ł' | 'Ł' => "l",
        'ñ' | 'ń' | 'ň' | 'Ñ' | 'Ń' | 'Ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø'
        | 'Ō' | 'Ő' => "o",
        'œ' | 'Œ' => "oe",
        'ř' | 'Ř' => "r",
        'ś' | 'š' | 'ş' | 'Ś' | 'Š' | 'Ş' => "s",
        'ß' | 'ẞ' => "ss",
        'ť' | 'ţ' | 'Ť' | 'Ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' | 'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů'
        | 'Ű' | 'Ų' => "u",
        'ý' | 'ÿ' | 'Ý' | 'Ÿ' => "y",
        'ź' | 'ż' | 'ž' | 'Ź' | 'Ż' | 'Ž' => "z",
        _ => "",
    }
}

/// Join a parent path and a child name into a child path.
pub fn child_path(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{}/{}", parent, slugify(name)),
        None => slugify(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Jawa Tengah"), "jawa-tengah");
        assert_eq!(slugify("Banjarmasin (Banjar)"), "banjarmasin-banjar");
        assert_eq!(slugify("  Toli-Toli "), "toli-toli");
        assert_eq!(slugify("Siau/Tagulandang"), "siau-tagulandang");
    }

    #[test]
    fn test_slugify_folds_diacritics() {
        assert_eq!(slugify("Sémarang"), "semarang");
        assert_eq!(slugify("Ñusa Ça"), "nusa-ca");
        assert_eq!(slugify("Straße"), "strasse");
        assert_eq!(slugify("Kota ☆ Baru"), "kota-baru");
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path(None, "DKI Jakarta"), "dki-jakarta");
        assert_eq!(
            child_path(Some("jawa-tengah"), "Kabupaten Cilacap"),
            "jawa-tengah/kabupaten-cilacap"
        );
    }
}
