pub const SCRIPT: &str = include_str!("../data/prompts/script.txt");
pub const NARRATION: &str = include_str!("../data/prompts/narration.txt");
pub const LIVE_WELCOME: &str = include_str!("../data/prompts/live_welcome.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(!SCRIPT.is_empty());
        assert!(!NARRATION.is_empty());
        assert!(!LIVE_WELCOME.is_empty());
    }

    #[test]
    fn test_script_prompt_wraps_topic() {
        assert_eq!(
            render(SCRIPT, &[("topic", "the python")]),
            "Write a short, dramatic news script about: the python"
        );
    }

    #[test]
    fn test_narration_has_text_placeholder() {
        assert!(NARRATION.contains("{{text}}"));
    }
}
