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

//! Request builders.

pub mod dataset_service {
    //! The request builders for [DatasetService][crate::client::DatasetService].
    //!
    //! Each builder accepts either a complete request, set with
    //! `with_request()`, or the most commonly used fields as individual
    //! setters. Setting both is an [invalid argument][crate::Error::is_invalid_argument]
    //! error, reported when the request is sent and before any network I/O.

    use crate::model;
    use gax::options::RequestOptions;
    use gax::paginator::{ItemPaginator, Paginator};
    use gaxi::client::{RpcClient, compose_request};

    /// A builder for [DatasetService][crate::client::DatasetService].
    ///
    /// ```no_run
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// # use aiplatform_v1beta1::*;
    /// # use builder::dataset_service::ClientBuilder;
    /// # use client::DatasetService;
    /// let builder: ClientBuilder = DatasetService::builder();
    /// let client = builder
    ///     .with_endpoint("https://us-central1-aiplatform.googleapis.com")
    ///     .build()
    ///     .await?;
    /// # gax::client_builder::Result::<()>::Ok(()) });
    /// ```
    pub type ClientBuilder =
        gax::client_builder::ClientBuilder<client::Factory, gax::credentials::Credentials>;

    pub(crate) mod client {
        use crate::client::DatasetService;
        use gaxi::options::ClientConfig;
        use gaxi::transport::TransportRegistry;

        #[derive(Debug, Default)]
        pub struct Factory {
            pub(crate) registry: TransportRegistry,
        }

        impl gax::client_builder::internal::ClientFactory for Factory {
            type Client = DatasetService;
            type Credentials = gax::credentials::Credentials;
            async fn build(
                self,
                config: ClientConfig,
            ) -> gax::client_builder::Result<Self::Client> {
                Self::Client::new(config, &self.registry).await
            }
        }
    }

    /// The state shared by all the request builders.
    #[derive(Clone, Debug)]
    pub(crate) struct RequestBuilder<R> {
        client: RpcClient,
        request: Option<R>,
        flattened: R,
        options: RequestOptions,
    }

    impl<R> RequestBuilder<R>
    where
        R: wkt::message::Message,
    {
        pub(crate) fn new(client: RpcClient) -> Self {
            Self {
                client,
                request: None,
                flattened: R::default(),
                options: RequestOptions::default(),
            }
        }

        fn compose(self) -> gax::Result<(RpcClient, R, RequestOptions)> {
            let request = compose_request(self.request, self.flattened)?;
            Ok((self.client, request, self.options))
        }
    }

    macro_rules! impl_request_builder {
        ($builder:ident, $request:ty) => {
            impl $builder {
                pub(crate) fn new(client: RpcClient) -> Self {
                    Self(RequestBuilder::new(client))
                }

                /// Sets the full request.
                ///
                /// Do not combine with the individual field setters.
                pub fn with_request<V: Into<$request>>(mut self, v: V) -> Self {
                    self.0.request = Some(v.into());
                    self
                }

                /// Sets all the options, replacing any prior values.
                pub fn with_options<V: Into<RequestOptions>>(mut self, v: V) -> Self {
                    self.0.options = v.into();
                    self
                }
            }

            impl gax::options::internal::RequestBuilder for $builder {
                fn request_options(&mut self) -> &mut RequestOptions {
                    &mut self.0.options
                }
            }
        };
    }

    /// The request builder for [DatasetService::get_dataset][crate::client::DatasetService::get_dataset] calls.
    #[derive(Clone, Debug)]
    pub struct GetDataset(RequestBuilder<model::GetDatasetRequest>);

    impl_request_builder!(GetDataset, model::GetDatasetRequest);

    impl GetDataset {
        /// Sets the value of [name][model::GetDatasetRequest::name].
        pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
            self.0.flattened.name = v.into();
            self
        }

        /// Sends the request.
        pub async fn send(self) -> gax::Result<model::Dataset> {
            self.send_with_metadata()
                .await
                .map(gax::response::Response::into_body)
        }

        /// Sends the request, and returns the response metadata with the
        /// dataset.
        pub async fn send_with_metadata(
            self,
        ) -> gax::Result<gax::response::Response<model::Dataset>> {
            let (client, request, options) = self.0.compose()?;
            client
                .invoke(&crate::descriptors::GET, request, options)
                .await
        }
    }

    /// The request builder for [DatasetService::list_datasets][crate::client::DatasetService::list_datasets] calls.
    #[derive(Clone, Debug)]
    pub struct ListDatasets(RequestBuilder<model::ListDatasetsRequest>);

    impl_request_builder!(ListDatasets, model::ListDatasetsRequest);

    impl ListDatasets {
        /// Sets the value of [parent][model::ListDatasetsRequest::parent].
        pub fn set_parent<T: Into<String>>(mut self, v: T) -> Self {
            self.0.flattened.parent = v.into();
            self
        }

        /// Sends the request and returns a single page.
        pub async fn send(self) -> gax::Result<model::ListDatasetsResponse> {
            let (client, request, options) = self.0.compose()?;
            client
                .invoke(&crate::descriptors::LIST, request, options)
                .await
                .map(gax::response::Response::into_body)
        }

        /// Sends the request and returns a stream of pages.
        ///
        /// The first page is fetched before this function returns. The
        /// following pages are fetched with the same options as the first.
        pub async fn by_page(self) -> gax::Result<Paginator<model::ListDatasetsResponse>> {
            let (client, request, options) = self.0.compose()?;
            client
                .paginate(&crate::descriptors::LIST, request, options, |r, token| {
                    r.set_page_token(token)
                })
                .await
        }

        /// Sends the request and returns a stream of datasets.
        pub async fn by_item(self) -> gax::Result<ItemPaginator<model::ListDatasetsResponse>> {
            self.by_page().await.map(Paginator::items)
        }
    }

    /// The request builder for [DatasetService::create_dataset][crate::client::DatasetService::create_dataset] calls.
    ///
    /// # Long running operations
    ///
    /// Use [poller()][CreateDataset::poller] to wait for the dataset, or
    /// [send()][CreateDataset::send] to get the operation handle and poll it
    /// yourself.
    #[derive(Clone, Debug)]
    pub struct CreateDataset(RequestBuilder<model::CreateDatasetRequest>);

    impl_request_builder!(CreateDataset, model::CreateDatasetRequest);

    impl CreateDataset {
        /// Sets the value of [parent][model::CreateDatasetRequest::parent].
        pub fn set_parent<T: Into<String>>(mut self, v: T) -> Self {
            self.0.flattened.parent = v.into();
            self
        }

        /// Sets the value of [dataset][model::CreateDatasetRequest::dataset].
        pub fn set_dataset<T: Into<model::Dataset>>(mut self, v: T) -> Self {
            self.0.flattened.dataset = Some(v.into());
            self
        }

        /// Sends the request, returning the operation handle.
        pub async fn send(self) -> gax::Result<lro::Operation> {
            let (client, request, options) = self.0.compose()?;
            client
                .invoke(&crate::descriptors::CREATE, request, options)
                .await
                .map(gax::response::Response::into_body)
        }

        /// Sends the request, and returns a future tracking the operation.
        ///
        /// The polling policies in the request options, if any, override the
        /// client's.
        pub async fn poller(
            self,
        ) -> gax::Result<
            lro::OperationFuture<model::Dataset, model::CreateDatasetOperationMetadata>,
        > {
            let client = self.0.client.clone();
            let options = self.0.options.clone();
            let operation = self.send().await?;
            Ok(client.operation_future(operation, options))
        }
    }

    /// The request builder for [DatasetService::delete_dataset][crate::client::DatasetService::delete_dataset] calls.
    #[derive(Clone, Debug)]
    pub struct DeleteDataset(RequestBuilder<model::DeleteDatasetRequest>);

    impl_request_builder!(DeleteDataset, model::DeleteDatasetRequest);

    impl DeleteDataset {
        /// Sets the value of [name][model::DeleteDatasetRequest::name].
        pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
            self.0.flattened.name = v.into();
            self
        }

        /// Sends the request, returning the operation handle.
        pub async fn send(self) -> gax::Result<lro::Operation> {
            let (client, request, options) = self.0.compose()?;
            client
                .invoke(&crate::descriptors::DELETE, request, options)
                .await
                .map(gax::response::Response::into_body)
        }

        /// Sends the request, and returns a future tracking the operation.
        pub async fn poller(
            self,
        ) -> gax::Result<lro::OperationFuture<wkt::Empty, model::DeleteOperationMetadata>>
        {
            let client = self.0.client.clone();
            let options = self.0.options.clone();
            let operation = self.send().await?;
            Ok(client.operation_future(operation, options))
        }
    }
}
