//! Fault-isolating wrapper around a selected provider
//!
//! Every provider call goes through [`ProviderAdapter`]. Rejections, error
//! emissions and panics (raised while creating the call or while polling it)
//! come back as [`RefactorError::EnumerationFailed`] or
//! [`RefactorError::ExecutionFailed`]; nothing escapes as an unwinding panic.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures::{stream, FutureExt, StreamExt};
use tracing::debug;

use super::{ProviderHandle, ResponseStream};
use crate::error::{panic_message, RefactorError, RefactorResult};
use crate::types::{
    AvailableRefactoring, EditMap, EditorContext, FreeformRequest, Position, Range,
    RefactorRequest, RefactorResponse,
};

/// Wraps one provider behind a failure-isolated contract
#[derive(Debug, Clone)]
pub struct ProviderAdapter {
    provider: ProviderHandle,
}

impl ProviderAdapter {
    /// Adapt an already selected provider
    pub fn new(provider: ProviderHandle) -> Self {
        Self { provider }
    }

    /// List refactorings for `range`; empty when the provider offers none
    pub async fn enumerate(
        &self,
        editor: &EditorContext,
        range: Range,
    ) -> RefactorResult<Vec<AvailableRefactoring>> {
        let name = self.provider.name();
        let call = panic::catch_unwind(AssertUnwindSafe(|| {
            self.provider.refactorings(editor, range)
        }));
        let outcome = match call {
            Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
            Err(payload) => Err(payload),
        };

        match outcome {
            Ok(Ok(refactorings)) => {
                debug!("Provider '{}' offered {} refactorings", name, refactorings.len());
                Ok(refactorings)
            }
            Ok(Err(err)) => Err(RefactorError::enumeration(name, describe(err))),
            Err(payload) => Err(RefactorError::enumeration(name, panicked(payload))),
        }
    }

    /// Compute a rename; `None` or an empty map means nothing to change
    pub async fn execute_rename(
        &self,
        editor: &EditorContext,
        position: Position,
        new_name: &str,
    ) -> RefactorResult<Option<EditMap>> {
        let name = self.provider.name();
        let call = panic::catch_unwind(AssertUnwindSafe(|| {
            self.provider.rename(editor, position, new_name)
        }));
        let outcome = match call {
            Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
            Err(payload) => Err(payload),
        };

        match outcome {
            Ok(Ok(edits)) => Ok(edits.filter(|edits| !edits.is_empty())),
            Ok(Err(err)) => Err(RefactorError::execution(name, describe(err))),
            Err(payload) => Err(RefactorError::execution(name, panicked(payload))),
        }
    }

    /// Execute a freeform refactoring as a stream of responses
    ///
    /// The stream ends after the first failure.
    pub fn execute_freeform(&self, request: FreeformRequest) -> ResponseStream {
        let name = self.provider.name().to_string();
        let responses = match panic::catch_unwind(AssertUnwindSafe(|| {
            self.provider.refactor(request)
        })) {
            Ok(responses) => responses,
            Err(payload) => {
                let err = RefactorError::execution(name, panicked(payload));
                return stream::once(async move { Err(err) }).boxed();
            }
        };

        AssertUnwindSafe(responses)
            .catch_unwind()
            .map(move |item| match item {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(err)) => Err(RefactorError::execution(name.as_str(), describe(err))),
                Err(payload) => Err(RefactorError::execution(name.as_str(), panicked(payload))),
            })
            .scan(false, |failed, item| {
                // nothing is forwarded after the first error
                if *failed {
                    return futures::future::ready(None);
                }
                *failed = item.is_err();
                futures::future::ready(Some(item))
            })
            .boxed()
    }

    /// Execute any request as a response stream
    ///
    /// Renames produce at most one [`RefactorResponse::Edit`].
    pub fn execute(&self, request: RefactorRequest) -> ResponseStream {
        match request {
            RefactorRequest::Freeform(request) => self.execute_freeform(request),
            RefactorRequest::Rename(request) => {
                let adapter = self.clone();
                stream::once(async move {
                    adapter
                        .execute_rename(&request.editor, request.position, &request.new_name)
                        .await
                })
                .filter_map(|result| async move {
                    match result {
                        Ok(Some(edits)) => Some(Ok(RefactorResponse::Edit { edits })),
                        Ok(None) => None,
                        Err(err) => Some(Err(err)),
                    }
                })
                .boxed()
            }
        }
    }
}

/// Provider-side message without our own wrapping prefix
fn describe(err: RefactorError) -> String {
    match err {
        RefactorError::ProviderError(message) => message,
        other => other.to_string(),
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> String {
    format!("provider panicked: {}", panic_message(payload.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::RefactorProvider;
    use crate::types::TextEdit;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[derive(Clone, Copy, PartialEq)]
    enum Fault {
        None,
        Reject,
        Panic,
        PanicOnCall,
        ErrorInStream,
        PanicInStream,
    }

    struct FaultyProvider {
        fault: Fault,
        scopes: Vec<String>,
    }

    impl FaultyProvider {
        fn handle(fault: Fault) -> ProviderHandle {
            ProviderHandle::from_provider(Self {
                fault,
                scopes: vec!["text.plain".to_string()],
            })
        }
    }

    fn sample_edits() -> EditMap {
        let mut edits = BTreeMap::new();
        edits.insert(
            PathBuf::from("/tmp/a.txt"),
            vec![TextEdit::new(
                Range::new(Position::new(0, 0), Position::new(0, 3)),
                "foo",
                "bar",
            )],
        );
        edits
    }

    #[async_trait]
    impl RefactorProvider for FaultyProvider {
        fn name(&self) -> &str {
            "faulty"
        }

        fn grammar_scopes(&self) -> &[String] {
            &self.scopes
        }

        fn priority(&self) -> i32 {
            1
        }

        async fn refactorings(
            &self,
            _editor: &EditorContext,
            range: Range,
        ) -> RefactorResult<Vec<AvailableRefactoring>> {
            match self.fault {
                Fault::Reject => Err(RefactorError::provider("index not ready")),
                Fault::Panic => panic!("enumeration exploded"),
                _ => Ok(vec![AvailableRefactoring::Rename { symbol_range: range }]),
            }
        }

        async fn rename(
            &self,
            _editor: &EditorContext,
            _position: Position,
            _new_name: &str,
        ) -> RefactorResult<Option<EditMap>> {
            match self.fault {
                Fault::Reject => Err(RefactorError::provider("symbol not found")),
                Fault::Panic => panic!("rename exploded"),
                Fault::ErrorInStream => Ok(Some(EditMap::new())),
                _ => Ok(Some(sample_edits())),
            }
        }

        fn refactor(&self, _request: FreeformRequest) -> ResponseStream {
            let progress = Ok(RefactorResponse::Progress {
                message: "working".to_string(),
                value: 1,
                max: 2,
            });
            match self.fault {
                Fault::PanicOnCall => panic!("refactor exploded"),
                Fault::ErrorInStream => stream::iter(vec![
                    progress,
                    Err(RefactorError::provider("compile error")),
                    Ok(RefactorResponse::Edit { edits: sample_edits() }),
                ])
                .boxed(),
                Fault::PanicInStream => stream::iter(vec![1, 2])
                    .map(|n| {
                        if n == 2 {
                            panic!("stream exploded");
                        }
                        Ok(RefactorResponse::Progress {
                            message: "working".to_string(),
                            value: n,
                            max: 2,
                        })
                    })
                    .boxed(),
                _ => stream::iter(vec![
                    progress,
                    Ok(RefactorResponse::Edit { edits: sample_edits() }),
                ])
                .boxed(),
            }
        }
    }

    fn editor() -> EditorContext {
        EditorContext::new("/tmp/a.txt", "text.plain", Range::point(Position::new(0, 1)))
    }

    fn freeform_request() -> FreeformRequest {
        FreeformRequest {
            editor: editor(),
            id: "asyncify".to_string(),
            range: Range::point(Position::new(0, 0)),
            original_range: Range::point(Position::new(0, 1)),
            arguments: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_enumerate_success() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::None));
        let refactorings = adapter
            .enumerate(&editor(), editor().selection)
            .await
            .unwrap();
        assert_eq!(refactorings.len(), 1);
    }

    #[tokio::test]
    async fn test_enumerate_rejection_is_enumeration_failure() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::Reject));
        let err = adapter
            .enumerate(&editor(), editor().selection)
            .await
            .unwrap_err();
        match err {
            RefactorError::EnumerationFailed { provider, message } => {
                assert_eq!(provider, "faulty");
                assert_eq!(message, "index not ready");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enumerate_panic_is_contained() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::Panic));
        let err = adapter
            .enumerate(&editor(), editor().selection)
            .await
            .unwrap_err();
        assert!(matches!(err, RefactorError::EnumerationFailed { .. }));
        assert!(err.to_string().contains("enumeration exploded"));
    }

    #[tokio::test]
    async fn test_rename_empty_map_is_none() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::ErrorInStream));
        let edits = adapter
            .execute_rename(&editor(), Position::new(0, 1), "bar")
            .await
            .unwrap();
        assert!(edits.is_none());
    }

    #[tokio::test]
    async fn test_rename_panic_is_execution_failure() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::Panic));
        let err = adapter
            .execute_rename(&editor(), Position::new(0, 1), "bar")
            .await
            .unwrap_err();
        assert!(matches!(err, RefactorError::ExecutionFailed { .. }));
    }

    #[tokio::test]
    async fn test_execute_rename_as_stream() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::None));
        let request = RefactorRequest::Rename(crate::types::RenameRequest {
            editor: editor(),
            position: Position::new(0, 1),
            new_name: "bar".to_string(),
        });
        let responses: Vec<_> = adapter.execute(request).collect().await;
        assert_eq!(responses.len(), 1);
        assert!(matches!(responses[0], Ok(RefactorResponse::Edit { .. })));
    }

    #[tokio::test]
    async fn test_execute_rename_without_edits_is_empty_stream() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::ErrorInStream));
        let request = RefactorRequest::Rename(crate::types::RenameRequest {
            editor: editor(),
            position: Position::new(0, 1),
            new_name: "bar".to_string(),
        });
        let responses: Vec<_> = adapter.execute(request).collect().await;
        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn test_freeform_stream_passes_progress_and_edit() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::None));
        let responses: Vec<_> = adapter.execute_freeform(freeform_request()).collect().await;
        assert_eq!(responses.len(), 2);
        assert!(matches!(responses[0], Ok(RefactorResponse::Progress { .. })));
        assert!(matches!(responses[1], Ok(RefactorResponse::Edit { .. })));
    }

    #[tokio::test]
    async fn test_freeform_stream_ends_after_error() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::ErrorInStream));
        let responses: Vec<_> = adapter.execute_freeform(freeform_request()).collect().await;
        assert_eq!(responses.len(), 2);
        match &responses[1] {
            Err(RefactorError::ExecutionFailed { message, .. }) => {
                assert_eq!(message, "compile error")
            }
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_freeform_panic_on_call_is_contained() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::PanicOnCall));
        let responses: Vec<_> = adapter.execute_freeform(freeform_request()).collect().await;
        assert_eq!(responses.len(), 1);
        assert!(matches!(responses[0], Err(RefactorError::ExecutionFailed { .. })));
    }

    #[tokio::test]
    async fn test_freeform_panic_while_streaming_is_contained() {
        let adapter = ProviderAdapter::new(FaultyProvider::handle(Fault::PanicInStream));
        let responses: Vec<_> = adapter.execute_freeform(freeform_request()).collect().await;
        assert_eq!(responses.len(), 2);
        assert!(responses[0].is_ok());
        assert!(responses[1]
            .as_ref()
            .unwrap_err()
            .to_string()
            .contains("stream exploded"));
    }
}
