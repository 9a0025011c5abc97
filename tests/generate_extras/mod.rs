use llm::{
    chat::{ChatMessage, ChatProvider, ChatResponse, Tool},
    error::LLMError,
};
use std::sync::Mutex;

#[macro_export]
macro_rules! assert_completions {
    (
        $(
            $test_name:ident : response => $response:expr, result => $result:expr
        ),+ $(,)?
    ) => {
        $(
            #[tokio::test]
            async fn $test_name() {
                let context = coursegen::generate::GenerateContext {
                    model: &StubLlmProvider::new($response.to_owned()),
                    prompt_template: None,
                    pacer: None,
                };
                let request = coursegen::CourseRequest::new(coursegen::SourceType::Text, "Rust");
                let result = coursegen::generate::request_completion(&request, &context)
                    .await
                    .expect("Expected successful completion.");

                assert_that(&result).is_equal_to($result.to_owned());
            }
        )+
    }
}

pub(crate) struct StubLlmProvider {
    response_content: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubLlmProvider {
    pub fn new(response_content: String) -> Self {
        StubLlmProvider {
            response_content: Some(response_content),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every chat call fails.
    #[allow(dead_code)]
    pub fn failing() -> Self {
        StubLlmProvider {
            response_content: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Contents of every message received so far.
    #[allow(dead_code)]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("Stub mutex poisoned").clone()
    }
}

impl ChatProvider for StubLlmProvider {
    fn chat<'life0, 'life1, 'async_trait>(
        &'life0 self,
        messages: &'life1 [ChatMessage],
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        self.prompts
            .lock()
            .expect("Stub mutex poisoned")
            .extend(messages.iter().map(|message| message.content.clone()));

        Box::pin(async move {
            #[derive(Debug)]
            struct StringResponse(String);

            impl ChatResponse for StringResponse {
                fn text(&self) -> Option<String> {
                    Some(self.0.clone())
                }

                fn tool_calls(&self) -> Option<Vec<llm::ToolCall>> {
                    panic!()
                }

                fn thinking(&self) -> Option<String> {
                    None
                }

                fn usage(&self) -> Option<llm::chat::Usage> {
                    None
                }
            }

            impl std::fmt::Display for StringResponse {
                fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(formatter, "{}", self.0)
                }
            }

            match &self.response_content {
                Some(content) => {
                    Ok(Box::new(StringResponse(content.clone())) as Box<dyn ChatResponse>)
                }
                None => Err(LLMError::ProviderError("stub failure".to_owned())),
            }
        })
    }

    fn chat_with_tools<'life0, 'life1, 'life2, 'async_trait>(
        &'life0 self,
        _messages: &'life1 [ChatMessage],
        _tools: Option<&'life2 [Tool]>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        Self: 'async_trait,
    {
        panic!()
    }
}
