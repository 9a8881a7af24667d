// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The operations sub-client.

use crate::model::*;
use gax::Result;
use gax::options::RequestOptions;
use gax::paginator::Paginator;
use std::sync::Arc;

/// Manages long-running operations on behalf of a service client.
///
/// Each transport provides an implementation that routes these calls to the
/// `google.longrunning.Operations` service of the backend the client talks
/// to. Applications use it to poll, list, cancel, delete, or wait on
/// operations by name, for example, operations started by a different
/// process.
#[async_trait::async_trait]
pub trait Operations: std::fmt::Debug + Send + Sync {
    /// Gets the latest state of a long-running operation.
    async fn get_operation(
        &self,
        request: GetOperationRequest,
        options: RequestOptions,
    ) -> Result<Operation>;

    /// Lists operations that match the filter in the request.
    async fn list_operations(
        &self,
        request: ListOperationsRequest,
        options: RequestOptions,
    ) -> Result<ListOperationsResponse>;

    /// Starts asynchronous cancellation on a long-running operation.
    ///
    /// Success means the server accepted the request, the operation may still
    /// complete normally.
    async fn cancel_operation(
        &self,
        request: CancelOperationRequest,
        options: RequestOptions,
    ) -> Result<()>;

    /// Deletes a long-running operation.
    async fn delete_operation(
        &self,
        request: DeleteOperationRequest,
        options: RequestOptions,
    ) -> Result<()>;

    /// Waits until the operation is done or the server-side timeout elapses.
    async fn wait_operation(
        &self,
        request: WaitOperationRequest,
        options: RequestOptions,
    ) -> Result<Operation>;
}

/// Fetches the first page of `ListOperations` and returns a paginator over
/// all the pages.
///
/// Every page is requested with the same `options`.
pub async fn list_operations_paginator(
    operations: Arc<dyn Operations>,
    request: ListOperationsRequest,
    options: RequestOptions,
) -> Result<Paginator<ListOperationsResponse>> {
    let initial = operations
        .list_operations(request.clone(), options.clone())
        .await?;
    let execute = move |token: String| {
        let operations = operations.clone();
        let request = request.clone().set_page_token(token);
        let options = options.clone();
        async move { operations.list_operations(request, options).await }
    };
    Ok(Paginator::new(initial, execute))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::TryStreamExt;
    use gax::paginator::PageableResponse;

    mockall::mock! {
        #[derive(Debug)]
        pub Operations {}
        #[async_trait::async_trait]
        impl Operations for Operations {
            async fn get_operation(&self, request: GetOperationRequest, options: RequestOptions) -> Result<Operation>;
            async fn list_operations(&self, request: ListOperationsRequest, options: RequestOptions) -> Result<ListOperationsResponse>;
            async fn cancel_operation(&self, request: CancelOperationRequest, options: RequestOptions) -> Result<()>;
            async fn delete_operation(&self, request: DeleteOperationRequest, options: RequestOptions) -> Result<()>;
            async fn wait_operation(&self, request: WaitOperationRequest, options: RequestOptions) -> Result<Operation>;
        }
    }

    fn page(names: &[&str], token: &str) -> ListOperationsResponse {
        ListOperationsResponse::default()
            .set_operations(names.iter().map(|n| Operation::default().set_name(*n)))
            .set_next_page_token(token)
    }

    #[tokio::test]
    async fn paginator_sends_tokens() -> anyhow::Result<()> {
        let mut mock = MockOperations::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_list_operations()
            .once()
            .in_sequence(&mut seq)
            .withf(|r, _| r.name == "projects/p/locations/l" && r.page_token.is_empty())
            .returning(|_, _| Ok(page(&["a", "b"], "t1")));
        mock.expect_list_operations()
            .once()
            .in_sequence(&mut seq)
            .withf(|r, o| r.page_token == "t1" && o.metadata().get("x-test").and_then(|v| v.as_str()) == Some("v"))
            .returning(|_, _| Ok(page(&["c"], "")));

        let mut options = RequestOptions::default();
        options.insert_header("x-test", "v");
        let request = ListOperationsRequest::default().set_name("projects/p/locations/l");
        let paginator = list_operations_paginator(Arc::new(mock), request, options).await?;
        let names = paginator
            .items()
            .map_ok(|o| o.name)
            .try_collect::<Vec<_>>()
            .await?;
        assert_eq!(names, vec!["a", "b", "c"]);
        Ok(())
    }

    #[tokio::test]
    async fn paginator_initial_error() {
        let mut mock = MockOperations::new();
        mock.expect_list_operations()
            .once()
            .returning(|_, _| Err(gax::error::Error::closed("closed")));
        let got = list_operations_paginator(
            Arc::new(mock),
            ListOperationsRequest::default(),
            RequestOptions::default(),
        )
        .await;
        assert!(matches!(got, Err(ref e) if e.is_closed()), "{got:?}");
        assert!(page(&[], "").next_page_token().is_empty());
    }
}
