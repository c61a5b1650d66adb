//! Identifier casing utilities shared by the generators

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for ch in s.chars() {
        if ch.is_uppercase() {
            // Word boundary on a lower-to-upper transition
            if prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else if !result.is_empty() && !result.ends_with('_') {
            // Any other character separates words
            result.push('_');
            prev_is_lowercase = false;
        }
    }

    result.trim_matches('_').to_string()
}

/// Convert a string to UpperCamelCase (PascalCase)
pub fn to_upper_camel_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Convert a string to lowerCamelCase
pub fn to_lower_camel_case(s: &str) -> String {
    let upper_camel = to_upper_camel_case(s);
    let mut chars = upper_camel.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Make a cased name usable as an identifier: digits cannot lead
pub fn leading_digit_safe(ident: String, prefix: &str) -> String {
    match ident.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("{}{}", prefix, ident),
        Some(_) => ident,
        None => prefix.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("myProp"), "my_prop");
        assert_eq!(to_snake_case("MyProp"), "my_prop");
        assert_eq!(to_snake_case("my-prop"), "my_prop");
        assert_eq!(to_snake_case("my_prop"), "my_prop");
        assert_eq!(to_snake_case("HTTPResponse"), "httpresponse");
        assert_eq!(to_snake_case("getHTTPResponse"), "get_httpresponse");
        assert_eq!(to_snake_case("can.see"), "can_see");
        assert_eq!(to_snake_case("api40Sdk"), "api40_sdk");
        assert_eq!(to_snake_case("__x__"), "x");
    }

    #[test]
    fn test_to_upper_camel_case() {
        assert_eq!(to_upper_camel_case("value_xyz"), "ValueXyz");
        assert_eq!(to_upper_camel_case("valueXyz"), "ValueXyz");
        assert_eq!(to_upper_camel_case("value-xyz"), "ValueXyz");
        assert_eq!(to_upper_camel_case("VALUE_XYZ"), "ValueXyz");
        assert_eq!(to_upper_camel_case("value1"), "Value1");
    }

    #[test]
    fn test_to_lower_camel_case() {
        assert_eq!(to_lower_camel_case("my_prop"), "myProp");
        assert_eq!(to_lower_camel_case("MyProp"), "myProp");
        assert_eq!(to_lower_camel_case("value_xyz"), "valueXyz");
        assert_eq!(to_lower_camel_case("default"), "default");
        assert_eq!(to_lower_camel_case(""), "");
    }

    #[test]
    fn test_leading_digit_safe() {
        assert_eq!(leading_digit_safe("4k".to_string(), "v"), "v4k");
        assert_eq!(leading_digit_safe("hd".to_string(), "v"), "hd");
        assert_eq!(leading_digit_safe(String::new(), "v"), "v");
    }
}
