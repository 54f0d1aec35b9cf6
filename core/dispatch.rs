use crate::error::Result;
use crate::prompt::Prompt;
use crate::tokens::estimate_tokens;
use log;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u64>,
    pub response_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

pub trait ModelClient {
    fn generate(&self, prompt: &Prompt, model: &str) -> Result<ModelResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    pub model: String,
    pub dry_run: bool,
    pub token_usage: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Preview {
        prompt: Prompt,
        token_estimate: Option<usize>,
    },
    Response(ModelResponse),
}

// `connect` only runs when the prompt is actually sent.
pub fn dispatch<C, F>(prompt: Prompt, options: &DispatchOptions, connect: F) -> Result<Dispatch>
where
    C: ModelClient,
    F: FnOnce() -> Result<C>,
{
    if options.dry_run {
        log::debug!("Dry run: prompt is {} bytes, not sending", prompt.len());
        let token_estimate = if options.token_usage {
            Some(estimate_tokens(prompt.as_str())?)
        } else {
            None
        };
        return Ok(Dispatch::Preview {
            prompt,
            token_estimate,
        });
    }

    let client = connect()?;
    log::info!("Sending request using model {}", options.model);
    let response = client.generate(&prompt, &options.model)?;
    log::debug!("Received {} bytes of response text", response.text.len());
    Ok(Dispatch::Response(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::prompt::build_prompt;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FakeClient {
        seen: Rc<RefCell<Vec<(String, String)>>>,
    }

    impl ModelClient for FakeClient {
        fn generate(&self, prompt: &Prompt, model: &str) -> Result<ModelResponse> {
            self.seen
                .borrow_mut()
                .push((prompt.to_string(), model.to_string()));
            Ok(ModelResponse {
                text: "answer".to_string(),
                usage: Some(TokenUsage {
                    prompt_tokens: Some(3),
                    response_tokens: Some(1),
                    total_tokens: Some(4),
                }),
            })
        }
    }

    fn options(dry_run: bool, token_usage: bool) -> DispatchOptions {
        DispatchOptions {
            model: "gemini-2.0-flash".to_string(),
            dry_run,
            token_usage,
        }
    }

    #[test]
    fn test_dry_run_never_connects() {
        let prompt = build_prompt::<String>("Summarize", &[]);
        let outcome = dispatch(prompt.clone(), &options(true, false), || -> Result<FakeClient> {
            Err(AppError::Authentication("should not be called".to_string()))
        })
        .unwrap();

        assert_eq!(
            outcome,
            Dispatch::Preview {
                prompt,
                token_estimate: None
            }
        );
    }

    #[test]
    fn test_dry_run_token_estimate() {
        let prompt = build_prompt::<String>("Summarize the attached files", &[]);
        let outcome = dispatch(prompt, &options(true, true), || -> Result<FakeClient> {
            Err(AppError::Authentication("unused".to_string()))
        })
        .unwrap();

        match outcome {
            Dispatch::Preview {
                token_estimate: Some(n),
                ..
            } => assert!(n > 0),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_send_uses_model_and_prompt() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let fake = FakeClient {
            seen: Rc::clone(&seen),
        };
        let prompt = build_prompt::<String>("Hi", &[]);
        let outcome = dispatch(prompt, &options(false, false), move || Ok(fake)).unwrap();

        match outcome {
            Dispatch::Response(resp) => assert_eq!(resp.text, "answer"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            seen.borrow().as_slice(),
            &[("Hi".to_string(), "gemini-2.0-flash".to_string())]
        );
    }

    #[test]
    fn test_connect_failure_is_propagated() {
        let prompt = build_prompt::<String>("Hi", &[]);
        let err = dispatch(prompt, &options(false, false), || -> Result<FakeClient> {
            Err(AppError::Authentication("no key".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }
}
