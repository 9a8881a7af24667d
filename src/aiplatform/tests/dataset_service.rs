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

//! End-to-end tests for the `DatasetService` client over a scripted
//! transport.

mod fake;

#[cfg(test)]
mod tests {
    use super::fake::*;
    use aiplatform_v1beta1::client::DatasetService;
    use aiplatform_v1beta1::hooks::{DatasetServiceHooks, DatasetServiceInterceptor};
    use aiplatform_v1beta1::model::*;
    use futures::TryStreamExt;
    use gax::error::rpc::Code;
    use gax::metadata::Metadata;
    use gax::options::RequestOptionsBuilder;
    use gax::paginator::PageableResponse;
    use gax::retry::Retry;
    use lro::OperationState;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    const DATASET: &str = "projects/p/locations/l/datasets/d";
    const PARENT: &str = "projects/p/locations/l";

    fn dataset(name: &str) -> Dataset {
        Dataset::default().set_name(format!("{PARENT}/datasets/{name}"))
    }

    fn keys(metadata: &Metadata) -> Vec<String> {
        metadata.iter().map(|(k, _)| k.to_string()).collect()
    }

    #[tokio::test]
    async fn get_dataset_routing_header() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(GET_DATASET, Dataset::default().set_name(DATASET).set_etag("e1"));
        let client = fake.client().await?;

        let response = client
            .get_dataset()
            .set_name(DATASET)
            .with_header("x-custom", "a")
            .send()
            .await?;
        assert_eq!(response, Dataset::default().set_name(DATASET).set_etag("e1"));

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.method, GET_DATASET);
        assert_eq!(call.request, json!({"name": DATASET}));
        assert_eq!(keys(&call.metadata), vec!["x-custom", "x-goog-request-params"]);
        let routing = call
            .metadata
            .get_all("x-goog-request-params")
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>();
        assert_eq!(routing, vec![format!("name={DATASET}")]);
        Ok(())
    }

    #[tokio::test]
    async fn get_dataset_with_metadata() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(GET_DATASET, Dataset::default().set_name(DATASET));
        let client = fake.client().await?;
        let response = client
            .get_dataset()
            .with_request(GetDatasetRequest::default().set_name(DATASET))
            .send_with_metadata()
            .await?;
        assert_eq!(response.body().name, DATASET);
        assert_eq!(
            response
                .metadata()
                .get("x-fake-server")
                .and_then(|v| v.as_str()),
            Some("true")
        );
        Ok(())
    }

    #[tokio::test]
    async fn list_datasets_pages() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(
            LIST_DATASETS,
            ListDatasetsResponse::default()
                .set_datasets([dataset("a"), dataset("b"), dataset("c")])
                .set_next_page_token("t1"),
        );
        fake.push_ok(
            LIST_DATASETS,
            ListDatasetsResponse::default().set_next_page_token("t2"),
        );
        fake.push_ok(
            LIST_DATASETS,
            ListDatasetsResponse::default().set_datasets([dataset("d"), dataset("e")]),
        );
        let client = fake.client().await?;

        let mut items = client
            .list_datasets()
            .with_request(
                ListDatasetsRequest::default()
                    .set_parent(PARENT)
                    .set_filter("labels.env=test"),
            )
            .by_item()
            .await?;
        // The first page is fetched eagerly.
        assert_eq!(fake.calls().len(), 1);
        let mut names = Vec::new();
        while let Some(d) = items.next().await {
            names.push(d?.name);
        }
        let want = ["a", "b", "c", "d", "e"]
            .map(|n| format!("{PARENT}/datasets/{n}"))
            .to_vec();
        assert_eq!(names, want);
        let last = items.latest_response().expect("at least one page was fetched");
        assert!(last.next_page_token().is_empty(), "{last:?}");

        let calls = fake.calls();
        let tokens = calls
            .iter()
            .map(|c| c.request.get("pageToken").cloned())
            .collect::<Vec<_>>();
        assert_eq!(tokens, vec![None, Some(json!("t1")), Some(json!("t2"))]);
        for call in &calls {
            assert_eq!(call.request.get("parent"), Some(&json!(PARENT)), "{call:?}");
            assert_eq!(
                call.request.get("filter"),
                Some(&json!("labels.env=test")),
                "{call:?}"
            );
            assert_eq!(
                call.metadata.get("x-goog-request-params").and_then(|v| v.as_str()),
                Some(format!("parent={PARENT}").as_str())
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn list_datasets_by_page() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(
            LIST_DATASETS,
            ListDatasetsResponse::default()
                .set_datasets([dataset("a")])
                .set_next_page_token("t1"),
        );
        fake.push_ok(
            LIST_DATASETS,
            ListDatasetsResponse::default().set_datasets([dataset("b")]),
        );
        let client = fake.client().await?;
        let pages = client
            .list_datasets()
            .set_parent(PARENT)
            .by_page()
            .await?
            .try_collect::<Vec<_>>()
            .await?;
        let sizes = pages.iter().map(|p| p.datasets.len()).collect::<Vec<_>>();
        assert_eq!(sizes, vec![1, 1]);
        assert_eq!(pages[0].next_page_token, "t1");
        Ok(())
    }

    #[tokio::test]
    async fn list_datasets_page_options() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(
            LIST_DATASETS,
            ListDatasetsResponse::default()
                .set_datasets([dataset("a")])
                .set_next_page_token("t1"),
        );
        fake.push_ok(LIST_DATASETS, ListDatasetsResponse::default());
        let client = fake.client().await?;
        let _ = client
            .list_datasets()
            .set_parent(PARENT)
            .with_header("x-custom", "a")
            .with_user_agent("my-app/1.0")
            .by_item()
            .await?
            .try_collect::<Vec<_>>()
            .await?;
        // Every page carries the original options.
        let calls = fake.calls();
        assert_eq!(calls.len(), 2);
        for call in &calls {
            assert_eq!(keys(&call.metadata), vec!["x-custom", "x-goog-request-params"]);
            assert_eq!(call.context.user_agent.as_deref(), Some("my-app/1.0"));
        }
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_dataset_polls_until_done() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        let progress = CreateDatasetOperationMetadata::default().set_generic_metadata(
            GenericOperationMetadata::default().set_partial_failures([wkt::Status::default()
                .set_code(5)
                .set_message("one item is missing")]),
        );
        let created = Dataset::default().set_name(DATASET).set_display_name("D");
        fake.push_ok(CREATE_DATASET, lro::Operation::default().set_name("op/1"));
        fake.push_ok(
            GET_OPERATION,
            lro::Operation::default()
                .set_name("op/1")
                .set_metadata(wkt::Any::from_msg(&progress)?),
        );
        fake.push_ok(
            GET_OPERATION,
            lro::Operation::default()
                .set_name("op/1")
                .set_done(true)
                .set_response(wkt::Any::from_msg(&created)?),
        );
        let client = fake.client().await?;

        let mut future = client
            .create_dataset()
            .set_parent(PARENT)
            .set_dataset(Dataset::default().set_display_name("D"))
            .poller()
            .await?;
        assert_eq!(future.name(), "op/1");
        assert!(!future.done());
        assert!(future.metadata()?.is_none());

        let got = future.result(None).await?;
        assert_eq!(got, created);
        assert!(future.done());
        assert_eq!(future.state(), OperationState::Succeeded);

        let calls = fake.calls();
        let methods = calls.iter().map(|c| c.method).collect::<Vec<_>>();
        assert_eq!(methods, vec![CREATE_DATASET, GET_OPERATION, GET_OPERATION]);
        assert_eq!(
            calls[0].request,
            json!({"parent": PARENT, "dataset": {"displayName": "D"}})
        );
        assert_eq!(calls[1].request, json!({"name": "op/1"}));
        assert_eq!(calls[1].at - calls[0].at, Duration::from_secs(1));
        assert_eq!(calls[2].at - calls[1].at, Duration::from_millis(1500));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_dataset_metadata() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        let progress = CreateDatasetOperationMetadata::default()
            .set_generic_metadata(GenericOperationMetadata::default());
        fake.push_ok(CREATE_DATASET, lro::Operation::default().set_name("op/1"));
        fake.push_ok(
            GET_OPERATION,
            lro::Operation::default()
                .set_name("op/1")
                .set_metadata(wkt::Any::from_msg(&progress)?),
        );
        let client = fake.client().await?;

        let mut future = client.create_dataset().set_parent(PARENT).poller().await?;
        assert!(!future.poll().await?);
        assert_eq!(future.state(), OperationState::Pending);
        assert_eq!(future.metadata()?, Some(progress));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_dataset_failed() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(
            CREATE_DATASET,
            lro::Operation::default()
                .set_name("op/1")
                .set_done(true)
                .set_error(wkt::Status::default().set_code(6).set_message("already exists")),
        );
        let client = fake.client().await?;
        let mut future = client.create_dataset().set_parent(PARENT).poller().await?;
        assert!(future.done());
        let got = future.result(None).await;
        let err = got.expect_err("the operation failed");
        assert_eq!(err.code(), Code::AlreadyExists, "{err:?}");
        let status = err.status().expect("the error carries the operation status");
        assert_eq!(status.message, "already exists");
        assert_eq!(fake.methods(), vec![CREATE_DATASET]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn get_dataset_retry_timing() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_err(GET_DATASET, Code::Unavailable, "try again");
        fake.push_err(GET_DATASET, Code::Unavailable, "try again");
        fake.push_ok(GET_DATASET, Dataset::default().set_name(DATASET));
        let client = fake.client().await?;

        let got = client
            .get_dataset()
            .set_name(DATASET)
            .with_retry(
                Retry::if_codes([Code::Unavailable])
                    .with_initial_delay(Duration::from_millis(100))
                    .with_multiplier(2.0)
                    .with_maximum_delay(Duration::from_secs(1))
                    .with_total_timeout(Duration::from_secs(5)),
            )
            .send()
            .await?;
        assert_eq!(got.name, DATASET);

        let calls = fake.calls();
        assert_eq!(calls.len(), 3);
        let first = calls[1].at - calls[0].at;
        let second = calls[2].at - calls[1].at;
        assert!(first <= Duration::from_millis(100), "{first:?}");
        assert!(second <= Duration::from_millis(200), "{second:?}");
        let attempts = calls.iter().map(|c| c.context.attempt_count).collect::<Vec<_>>();
        assert_eq!(attempts, vec![1, 2, 3]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_dataset_not_retried() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_err(CREATE_DATASET, Code::Unavailable, "try again");
        let client = fake.client().await?;
        let got = client.create_dataset().set_parent(PARENT).send().await;
        let err = got.expect_err("the error is not retried");
        assert_eq!(err.code(), Code::Unavailable, "{err:?}");
        assert_eq!(fake.calls().len(), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn client_retry_policy() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        for _ in 0..3 {
            fake.push_err(GET_DATASET, Code::ResourceExhausted, "slow down");
        }
        fake.push_ok(GET_DATASET, Dataset::default().set_name(DATASET));
        let client = DatasetService::builder_with_transports(fake.registry())
            .with_retry(
                Retry::if_codes([Code::ResourceExhausted])
                    .with_initial_delay(Duration::from_millis(10))
                    .with_total_timeout(Duration::from_secs(60)),
            )
            .build()
            .await?;
        let got = client.get_dataset().set_name(DATASET).send().await?;
        assert_eq!(got.name, DATASET);
        assert_eq!(fake.calls().len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn create_dataset_conflicting_arguments() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        let client = fake.client().await?;

        let got = client
            .create_dataset()
            .with_request(CreateDatasetRequest::default().set_parent("p1"))
            .set_parent("p2")
            .send()
            .await;
        assert!(matches!(&got, Err(e) if e.is_invalid_argument()), "{got:?}");
        let got = client
            .create_dataset()
            .set_parent("p2")
            .with_request(CreateDatasetRequest::default().set_parent("p1"))
            .poller()
            .await;
        assert!(matches!(&got, Err(e) if e.is_invalid_argument()), "{got:?}");
        assert!(fake.calls().is_empty(), "{:?}", fake.calls());
        Ok(())
    }

    #[tokio::test]
    async fn request_only() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(CREATE_DATASET, lro::Operation::default().set_name("op/1"));
        let client = fake.client().await?;
        let op = client
            .create_dataset()
            .with_request(CreateDatasetRequest::default().set_parent("p1"))
            .send()
            .await?;
        assert_eq!(op.name, "op/1");
        assert_eq!(fake.calls()[0].request, json!({"parent": "p1"}));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_dataset_cancel() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(CREATE_DATASET, lro::Operation::default().set_name("op/1"));
        fake.push_ok(CANCEL_OPERATION, wkt::Empty::default());
        fake.push_ok(
            GET_OPERATION,
            lro::Operation::default()
                .set_name("op/1")
                .set_done(true)
                .set_error(wkt::Status::default().set_code(1).set_message("cancelled")),
        );
        let client = fake.client().await?;

        let mut future = client.create_dataset().set_parent(PARENT).poller().await?;
        future.cancel().await?;
        assert!(future.poll().await?);
        assert!(future.done());
        assert_eq!(future.state(), OperationState::Cancelled);

        for _ in 0..2 {
            let got = future.result(None).await;
            assert!(matches!(&got, Err(e) if e.code() == Code::Cancelled), "{got:?}");
            assert!(future.done());
        }

        let calls = fake.calls();
        let methods = calls.iter().map(|c| c.method).collect::<Vec<_>>();
        assert_eq!(methods, vec![CREATE_DATASET, CANCEL_OPERATION, GET_OPERATION]);
        assert_eq!(calls[1].request, json!({"name": "op/1"}));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn result_deadline() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(CREATE_DATASET, lro::Operation::default().set_name("op/1"));
        for _ in 0..10 {
            fake.push_ok(GET_OPERATION, lro::Operation::default().set_name("op/1"));
        }
        let client = fake.client().await?;
        let mut future = client.create_dataset().set_parent(PARENT).poller().await?;
        let got = future.result(Some(Duration::from_secs(3))).await;
        assert!(matches!(&got, Err(e) if e.code() == Code::DeadlineExceeded), "{got:?}");
        assert!(!future.done());
        Ok(())
    }

    #[derive(Debug)]
    struct Stamp;

    impl DatasetServiceHooks for Stamp {
        fn pre_get_dataset(
            &self,
            request: GetDatasetRequest,
            metadata: Metadata,
        ) -> (GetDatasetRequest, Metadata) {
            (request, metadata.with_ascii("x-stamp", "pre"))
        }

        fn post_get_dataset(&self, response: Dataset) -> Dataset {
            response.set_description("stamped")
        }
    }

    #[tokio::test]
    async fn typed_hooks() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(GET_DATASET, Dataset::default().set_name(DATASET));
        let client = DatasetService::builder_with_transports(fake.registry())
            .with_interceptor(DatasetServiceInterceptor::new(Stamp))
            .build()
            .await?;
        let got = client.get_dataset().set_name(DATASET).send().await?;
        assert_eq!(got.description, "stamped");
        let calls = fake.calls();
        assert_eq!(
            keys(&calls[0].metadata),
            vec!["x-goog-request-params", "x-stamp"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn close() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(GET_DATASET, Dataset::default().set_name(DATASET));
        let client = fake.client().await?;
        let _ = client.get_dataset().set_name(DATASET).send().await?;

        client.close();
        client.close();
        assert!(client.is_closed());
        let got = client.get_dataset().set_name(DATASET).send().await;
        assert!(matches!(&got, Err(e) if e.is_closed()), "{got:?}");
        Ok(())
    }

    #[tokio::test]
    async fn operations_sub_client() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(
            GET_OPERATION,
            lro::Operation::default().set_name("op/2").set_done(true),
        );
        let client = fake.client().await?;
        let op = client
            .operations()
            .get_operation(
                lro::model::GetOperationRequest::default().set_name("op/2"),
                gax::options::RequestOptions::default(),
            )
            .await?;
        assert!(op.done);

        let mut future = client.create_dataset_future(op);
        assert!(future.done());
        let got = future.result(None).await;
        // A completed operation with neither a response nor an error.
        assert!(got.is_err(), "{got:?}");
        Ok(())
    }
}
