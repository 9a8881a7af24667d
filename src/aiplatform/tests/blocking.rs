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

//! Tests for the blocking `DatasetService` client.

mod fake;

#[cfg(test)]
mod tests {
    use super::fake::*;
    use aiplatform_v1beta1::blocking;
    use aiplatform_v1beta1::client::DatasetService;
    use aiplatform_v1beta1::model::*;
    use gax::error::rpc::Code;
    use gax::options::RequestOptionsBuilder;
    use gax::polling_backoff_policy::PollingBackoffPolicy;
    use lro::OperationState;
    use std::time::Duration;

    const PARENT: &str = "projects/p/locations/l";

    fn client(fake: &FakeTransport) -> anyhow::Result<blocking::DatasetService> {
        let client =
            blocking::DatasetService::new(DatasetService::builder_with_transports(fake.registry()))?;
        Ok(client)
    }

    /// Polls without waiting, the tests use the real clock.
    #[derive(Debug)]
    struct NoWait;

    impl PollingBackoffPolicy for NoWait {
        fn wait_period(&self, _loop_start: std::time::Instant, _attempt_count: u32) -> Duration {
            Duration::ZERO
        }
    }

    #[test]
    fn get_dataset() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(GET_DATASET, Dataset::default().set_name(format!("{PARENT}/datasets/d")));
        let client = client(&fake)?;
        let got = client.get_dataset(|b| b.set_name(format!("{PARENT}/datasets/d")))?;
        assert_eq!(got.name, format!("{PARENT}/datasets/d"));
        assert_eq!(fake.methods(), vec![GET_DATASET]);
        Ok(())
    }

    #[test]
    fn get_dataset_error() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_err(GET_DATASET, Code::NotFound, "no such dataset");
        let client = client(&fake)?;
        let got = client.get_dataset(|b| b.set_name(format!("{PARENT}/datasets/d")));
        assert!(matches!(&got, Err(e) if e.code() == Code::NotFound), "{got:?}");
        Ok(())
    }

    #[test]
    fn list_datasets() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        let page = |names: &[&str], token: &str| {
            ListDatasetsResponse::default()
                .set_datasets(names.iter().map(|n| Dataset::default().set_name(*n)))
                .set_next_page_token(token)
        };
        fake.push_ok(LIST_DATASETS, page(&["a", "b", "c"], "t1"));
        fake.push_ok(LIST_DATASETS, page(&[], "t2"));
        fake.push_ok(LIST_DATASETS, page(&["d", "e"], ""));
        let client = client(&fake)?;

        let pages = client.list_datasets(|b| b.set_parent(PARENT))?;
        assert_eq!(fake.calls().len(), 1);
        let mut items = pages.items();
        let names = items
            .by_ref()
            .map(|d| d.map(|d| d.name))
            .collect::<gax::Result<Vec<_>>>()?;
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
        let last = items.latest_response().expect("the pages were fetched");
        assert!(last.next_page_token.is_empty(), "{last:?}");
        assert_eq!(fake.calls().len(), 3);
        Ok(())
    }

    #[test]
    fn create_dataset() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        let created = Dataset::default().set_name(format!("{PARENT}/datasets/d"));
        fake.push_ok(CREATE_DATASET, lro::Operation::default().set_name("op/1"));
        fake.push_ok(GET_OPERATION, lro::Operation::default().set_name("op/1"));
        fake.push_ok(
            GET_OPERATION,
            lro::Operation::default()
                .set_name("op/1")
                .set_done(true)
                .set_response(wkt::Any::from_msg(&created)?),
        );
        let client = client(&fake)?;

        let mut future = client.create_dataset(|b| {
            b.set_parent(PARENT)
                .set_dataset(Dataset::default().set_display_name("D"))
                .with_polling_backoff_policy(NoWait)
        })?;
        assert_eq!(future.state(), OperationState::Pending);
        let got = future.result(None)?;
        assert_eq!(got, created);
        assert!(future.done());
        assert_eq!(
            fake.methods(),
            vec![CREATE_DATASET, GET_OPERATION, GET_OPERATION]
        );
        Ok(())
    }

    #[test]
    fn delete_dataset_cancelled() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(
            "google.cloud.aiplatform.v1beta1.DatasetService/DeleteDataset",
            lro::Operation::default().set_name("op/2"),
        );
        fake.push_ok(CANCEL_OPERATION, wkt::Empty::default());
        fake.push_ok(
            GET_OPERATION,
            lro::Operation::default()
                .set_name("op/2")
                .set_done(true)
                .set_error(wkt::Status::default().set_code(1)),
        );
        let client = client(&fake)?;
        let mut future =
            client.delete_dataset(|b| b.set_name(format!("{PARENT}/datasets/d")))?;
        future.cancel()?;
        assert!(future.poll()?);
        assert_eq!(future.state(), OperationState::Cancelled);
        let got = future.result(None);
        assert!(matches!(&got, Err(e) if e.code() == Code::Cancelled), "{got:?}");
        Ok(())
    }

    #[test]
    fn delete_dataset() -> anyhow::Result<()> {
        let fake = FakeTransport::default();
        fake.push_ok(
            "google.cloud.aiplatform.v1beta1.DatasetService/DeleteDataset",
            lro::Operation::default().set_name("op/2").set_done(true),
        );
        let client = client(&fake)?;
        let mut future =
            client.delete_dataset(|b| b.set_name(format!("{PARENT}/datasets/d")))?;
        // Delete operations have no response, completing is enough.
        future.result(None)?;
        assert_eq!(
            fake.calls()[0].request,
            serde_json::json!({"name": format!("{PARENT}/datasets/d")})
        );
        Ok(())
    }
}
