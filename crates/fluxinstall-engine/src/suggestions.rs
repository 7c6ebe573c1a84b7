//! Fuzzy matching suggestions for template errors
//!
//! Uses Levenshtein distance to point at the parameter field or function a
//! template most likely meant when it references an unknown name.

use fluxinstall_core::TemplateParameters;

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Global names MiniJinja defines on its own
pub const BUILTIN_GLOBALS: &[&str] = &["range", "dict", "debug", "namespace"];

/// Suggestion result with confidence scoring
#[derive(Debug, Clone)]
struct Suggestion {
    /// The suggested correction
    text: String,
    /// Levenshtein distance (lower = better match)
    distance: usize,
}

/// Find closest matches from a list of candidates
fn find_closest_matches(input: &str, candidates: &[&str], max_results: usize) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = strsim::levenshtein(input, candidate);
            if distance <= MAX_SUGGESTION_DISTANCE && distance > 0 {
                Some(Suggestion {
                    text: candidate.to_string(),
                    distance,
                })
            } else {
                None
            }
        })
        .collect();

    // Best matches first; ties keep candidate order
    suggestions.sort_by_key(|s| s.distance);
    suggestions.truncate(max_results);
    suggestions
}

/// Suggest a parameter field for an unknown variable name
pub fn suggest_field(name: &str) -> Option<String> {
    // Go-style names (`GitURL`) are a common slip
    let snake = to_snake_case(name);
    if snake != name && TemplateParameters::has_field(&snake) {
        return Some(format!("Did you mean `{}`? Fields are snake_case.", snake));
    }

    let matches = find_closest_matches(name, TemplateParameters::FIELDS, 3);
    if matches.is_empty() {
        Some(format!(
            "`{}` is not a template parameter. Available: {}",
            name,
            TemplateParameters::FIELDS.join(", ")
        ))
    } else {
        let suggestions: Vec<String> = matches.iter().map(|s| format!("`{}`", s.text)).collect();
        Some(format!("Did you mean {}?", suggestions.join(" or ")))
    }
}

/// Suggest a function for an unknown function name
pub fn suggest_function(name: &str, available: &[&str]) -> Option<String> {
    if name == "StringsJoin" && available.contains(&"join") {
        return Some("Did you mean `join`?".to_string());
    }

    let matches = find_closest_matches(name, available, 2);
    if let Some(best) = matches.first() {
        Some(format!("Did you mean `{}`?", best.text))
    } else {
        Some(format!("Available functions: {}", available.join(", ")))
    }
}

/// Extract the variable name from an "undefined value" style message
pub fn extract_variable_name(msg: &str) -> Option<String> {
    // Messages look like: "undefined value: `foo`" or mention 'foo'
    for quote in ['`', '\''] {
        if let Some(start) = msg.find(quote) {
            if let Some(end) = msg[start + 1..].find(quote) {
                let name = &msg[start + 1..start + 1 + end];
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
    }
    None
}

fn to_snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && chars[i - 1].is_lowercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}
