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

//! Contains the DatasetService client and related types.

use crate::builder::dataset_service::*;
use gaxi::client::RpcClient;
use gaxi::options::ClientConfig;
use gaxi::transport::TransportRegistry;
use std::sync::Arc;

/// Implements a client for the Vertex AI dataset service.
///
/// # Example
/// ```no_run
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// # use aiplatform_v1beta1::client::DatasetService;
/// let client = DatasetService::builder().build().await?;
/// let dataset = client
///     .get_dataset()
///     .set_name("projects/my-project/locations/us-central1/datasets/123")
///     .send()
///     .await?;
/// println!("dataset = {dataset:?}");
/// # Ok::<(), Box<dyn std::error::Error>>(()) });
/// ```
///
/// # Configuration
///
/// To configure `DatasetService` use the `with_*` methods in the type
/// returned by [builder()][DatasetService::builder]. The default configuration
/// should work for most applications. Common configuration changes include
///
/// * [with_endpoint()]: by default this client uses the global default
///   endpoint (`https://aiplatform.googleapis.com`). Applications using
///   regional endpoints, e.g. `https://us-central1-aiplatform.googleapis.com`,
///   must override this default.
/// * [with_credentials()]: by default this client sends no credentials.
/// * [with_transport()]: by default this client uses gRPC, use `"rest"` to
///   send JSON over HTTP/1.1.
///
/// # Pooling and Cloning
///
/// `DatasetService` holds a connection pool internally, it is advised to
/// create one and reuse it. You do not need to wrap `DatasetService` in an
/// [Rc](std::rc::Rc) or [Arc] to reuse it, because it already uses an `Arc`
/// internally.
///
/// # Service Description
///
/// The service that manages Vertex AI datasets. Datasets are created and
/// deleted with long-running operations.
///
/// [with_endpoint()]: ClientBuilder::with_endpoint
/// [with_credentials()]: ClientBuilder::with_credentials
/// [with_transport()]: ClientBuilder::with_transport
#[derive(Clone, Debug)]
pub struct DatasetService {
    inner: RpcClient,
}

impl DatasetService {
    /// Returns a builder for [DatasetService].
    ///
    /// ```no_run
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// # use aiplatform_v1beta1::client::DatasetService;
    /// let client = DatasetService::builder().build().await?;
    /// # gax::client_builder::Result::<()>::Ok(()) });
    /// ```
    pub fn builder() -> ClientBuilder {
        gax::client_builder::internal::new_builder(client::Factory::default())
    }

    /// Returns a builder selecting the transport from `registry`.
    ///
    /// Use this to run the client over a custom transport. The transport is
    /// selected with [with_transport()][ClientBuilder::with_transport], or is
    /// the first transport in `registry` if none is selected.
    pub fn builder_with_transports(registry: TransportRegistry) -> ClientBuilder {
        gax::client_builder::internal::new_builder(client::Factory { registry })
    }

    pub(crate) async fn new(
        config: ClientConfig,
        registry: &TransportRegistry,
    ) -> gax::client_builder::Result<Self> {
        let inner = RpcClient::with_registry(config, crate::info::SERVICE, registry)
            .await?
            .with_operations(crate::descriptors::operations());
        Ok(Self { inner })
    }

    /// Gets a dataset.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_v1beta1::client::DatasetService;
    /// async fn example(client: &DatasetService) -> gax::Result<()> {
    ///     let dataset = client
    ///         .get_dataset()
    ///         .set_name("projects/p/locations/l/datasets/d")
    ///         .send()
    ///         .await?;
    ///     println!("dataset = {dataset:?}");
    ///     Ok(())
    /// }
    /// ```
    pub fn get_dataset(&self) -> GetDataset {
        GetDataset::new(self.inner.clone())
    }

    /// Lists datasets in a location.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_v1beta1::client::DatasetService;
    /// async fn example(client: &DatasetService) -> gax::Result<()> {
    ///     let mut items = client
    ///         .list_datasets()
    ///         .set_parent("projects/p/locations/l")
    ///         .by_item()
    ///         .await?;
    ///     while let Some(dataset) = items.next().await {
    ///         println!("dataset = {:?}", dataset?);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn list_datasets(&self) -> ListDatasets {
        ListDatasets::new(self.inner.clone())
    }

    /// Creates a dataset.
    ///
    /// This is a long-running operation, the result is the new
    /// [Dataset][crate::model::Dataset].
    ///
    /// # Example
    /// ```
    /// # use aiplatform_v1beta1::client::DatasetService;
    /// # use aiplatform_v1beta1::model::Dataset;
    /// async fn example(client: &DatasetService) -> gax::Result<()> {
    ///     let mut poller = client
    ///         .create_dataset()
    ///         .set_parent("projects/p/locations/l")
    ///         .set_dataset(Dataset::default().set_display_name("my dataset"))
    ///         .poller()
    ///         .await?;
    ///     let dataset = poller.result(None).await?;
    ///     println!("dataset = {dataset:?}");
    ///     Ok(())
    /// }
    /// ```
    pub fn create_dataset(&self) -> CreateDataset {
        CreateDataset::new(self.inner.clone())
    }

    /// Deletes a dataset.
    ///
    /// This is a long-running operation, with no result.
    pub fn delete_dataset(&self) -> DeleteDataset {
        DeleteDataset::new(self.inner.clone())
    }

    /// The operations sub-client, sharing this client's transport.
    ///
    /// Use it to list operations, or to poll operations started by other
    /// processes.
    pub fn operations(&self) -> Arc<dyn lro::Operations> {
        self.inner.operations()
    }

    /// Resumes tracking a `CreateDataset` operation, given its handle.
    pub fn create_dataset_future(
        &self,
        operation: lro::Operation,
    ) -> lro::OperationFuture<crate::model::Dataset, crate::model::CreateDatasetOperationMetadata>
    {
        self.inner
            .operation_future(operation, gax::options::RequestOptions::default())
    }

    /// Closes the underlying transport.
    ///
    /// Calls in progress, and any later calls, fail with an error. Closing a
    /// client more than once has no further effect.
    pub fn close(&self) {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
