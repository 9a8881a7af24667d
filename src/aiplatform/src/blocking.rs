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

//! A blocking client for applications that do not use `async`.
//!
//! The blocking client owns a Tokio runtime, and runs each call to
//! completion on it. Do not use it from within an asynchronous context, as
//! blocking on the runtime would panic.
//!
//! ```no_run
//! # use aiplatform_v1beta1::blocking::DatasetService;
//! # use aiplatform_v1beta1::client;
//! let client = DatasetService::new(client::DatasetService::builder())?;
//! for dataset in client.list_datasets(|b| b.set_parent("projects/p/locations/l"))?.items() {
//!     println!("dataset = {:?}", dataset?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::builder::dataset_service::*;
use crate::model;
use gax::Result;
use gax::client_builder::Error as BuilderError;
use gax::paginator::BlockingPaginator;
use lro::blocking::BlockingOperationFuture;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// A blocking version of [DatasetService][crate::client::DatasetService].
///
/// Each method receives a function to configure the request builder, and
/// blocks until the call completes. Pagers and operation futures returned by
/// this client block on each page or poll.
#[derive(Clone, Debug)]
pub struct DatasetService {
    runtime: Arc<Runtime>,
    inner: crate::client::DatasetService,
}

impl DatasetService {
    /// Creates a runtime and builds the client on it.
    pub fn new(builder: ClientBuilder) -> gax::client_builder::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(BuilderError::transport)?;
        let inner = runtime.block_on(builder.build())?;
        Ok(Self::from_async(Arc::new(runtime), inner))
    }

    /// Wraps an asynchronous client, running its calls on `runtime`.
    pub fn from_async(runtime: Arc<Runtime>, inner: crate::client::DatasetService) -> Self {
        Self { runtime, inner }
    }

    /// Gets a dataset.
    ///
    /// ```no_run
    /// # use aiplatform_v1beta1::blocking::DatasetService;
    /// fn example(client: &DatasetService) -> aiplatform_v1beta1::Result<()> {
    ///     let dataset = client.get_dataset(|b| b.set_name("projects/p/locations/l/datasets/d"))?;
    ///     println!("dataset = {dataset:?}");
    ///     Ok(())
    /// }
    /// ```
    pub fn get_dataset<F>(&self, configure: F) -> Result<model::Dataset>
    where
        F: FnOnce(GetDataset) -> GetDataset,
    {
        let builder = configure(self.inner.get_dataset());
        self.runtime.block_on(builder.send())
    }

    /// Lists datasets, returning an iterator over the pages.
    ///
    /// The first page is fetched before this function returns.
    pub fn list_datasets<F>(
        &self,
        configure: F,
    ) -> Result<BlockingPaginator<model::ListDatasetsResponse>>
    where
        F: FnOnce(ListDatasets) -> ListDatasets,
    {
        let builder = configure(self.inner.list_datasets());
        let pages = self.runtime.block_on(builder.by_page())?;
        Ok(BlockingPaginator::new(self.runtime.clone(), pages))
    }

    /// Starts creating a dataset.
    pub fn create_dataset<F>(
        &self,
        configure: F,
    ) -> Result<BlockingOperationFuture<model::Dataset, model::CreateDatasetOperationMetadata>>
    where
        F: FnOnce(CreateDataset) -> CreateDataset,
    {
        let builder = configure(self.inner.create_dataset());
        let future = self.runtime.block_on(builder.poller())?;
        Ok(BlockingOperationFuture::new(self.runtime.clone(), future))
    }

    /// Starts deleting a dataset.
    pub fn delete_dataset<F>(
        &self,
        configure: F,
    ) -> Result<BlockingOperationFuture<wkt::Empty, model::DeleteOperationMetadata>>
    where
        F: FnOnce(DeleteDataset) -> DeleteDataset,
    {
        let builder = configure(self.inner.delete_dataset());
        let future = self.runtime.block_on(builder.poller())?;
        Ok(BlockingOperationFuture::new(self.runtime.clone(), future))
    }

    /// The asynchronous client used by this client.
    pub fn as_async(&self) -> &crate::client::DatasetService {
        &self.inner
    }

    /// Closes the underlying transport.
    pub fn close(&self) {
        self.inner.close()
    }
}
