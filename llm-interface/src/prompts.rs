use crate::types::{ChatRequest, Message};

pub const TEMPERATURE: f32 = 0.2;

pub const TASK_PROMPT: &str = "You are a core AI that will categorize captions into the right categories. You will be given captions of instagram posts, and categorize them accordingly.";

// The `\n` sequences are literal backslash-n; the parser accepts both forms.
pub const FORMAT_PROMPT: &str = r"Please respond with this format. =-=-=-=\n\nREASONING : {YOUR REASONING} \nCATEGORIES: {consisting array of categories, if multiple. if singular, use array with one item}";

pub const CAPTION_PREFIX: &str = r"This is the caption that you need to categorize\n";

/// Two system messages then the caption, always in this order.
pub fn build_request(caption: &str, model: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            Message::system(TASK_PROMPT),
            Message::system(FORMAT_PROMPT),
            Message::user(format!("{CAPTION_PREFIX}{caption}")),
        ],
        temperature: TEMPERATURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = build_request("sunset at the beach", "some/model");

        assert_eq!(request.model, "some/model");
        assert_eq!(request.temperature, 0.2);

        let roles: Vec<_> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "system", "user"]);
        assert!(request.messages[1].content.contains("=-=-=-="));
        assert_eq!(
            request.messages[2].content,
            "This is the caption that you need to categorize\\nsunset at the beach"
        );
    }

    #[test]
    fn test_request_serializes_as_openai_body() {
        let body = serde_json::to_value(build_request("hi", "m")).unwrap();
        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
    }
}
