/// Generate a URL-safe slug from a display name.
///
/// Lowercases, maps a handful of common accented letters to ASCII, replaces
/// every other non-alphanumeric run with a single dash and trims the ends.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_dash = true;
    for ch in input.chars() {
        let mapped: Option<char> = match ch {
            'ç' | 'Ç' => Some('c'),
            'ğ' | 'Ğ' => Some('g'),
            'ı' | 'İ' => Some('i'),
            'ö' | 'Ö' => Some('o'),
            'ş' | 'Ş' => Some('s'),
            'ü' | 'Ü' => Some('u'),
            'é' | 'è' | 'ê' | 'ë' => Some('e'),
            'á' | 'à' | 'â' | 'ä' => Some('a'),
            _ if ch.is_ascii_alphanumeric() => Some(ch.to_ascii_lowercase()),
            _ => None,
        };
        match mapped {
            Some(c) => {
                out.push(c);
                last_dash = false;
            }
            None => {
                if !last_dash {
                    out.push('-');
                    last_dash = true;
                }
            }
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators() {
        assert_eq!(slugify("Acme  Child -- Center"), "acme-child-center");
    }

    #[test]
    fn folds_accented_letters() {
        assert_eq!(slugify("Gelişim Çocuk"), "gelisim-cocuk");
    }

    #[test]
    fn trims_leading_and_trailing_junk() {
        assert_eq!(slugify("  --hello!  "), "hello");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(slugify("!!!"), "");
    }
}
