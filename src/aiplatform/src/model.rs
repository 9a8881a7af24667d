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

//! The messages used by the `DatasetService`.

use gax::paginator::PageableResponse;
use std::collections::HashMap;

/// A collection of data items used to train or evaluate models.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dataset {
    /// The resource name, in
    /// `projects/{project}/locations/{location}/datasets/{dataset}` format.
    /// Output only.
    #[prost(string, tag = "1")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// The user-defined name of the dataset, up to 128 UTF-8 characters.
    #[prost(string, tag = "2")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,

    /// Points to a YAML file in Cloud Storage describing additional
    /// information about the dataset.
    #[prost(string, tag = "3")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub metadata_schema_uri: String,

    /// Used to perform consistent read-modify-write updates.
    #[prost(string, tag = "6")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub etag: String,

    /// The labels with user-defined metadata to organize datasets.
    #[prost(map = "string, string", tag = "7")]
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,

    /// The description of the dataset.
    #[prost(string, tag = "16")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Dataset {
    /// Sets the value of [name][Dataset::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the value of [display_name][Dataset::display_name].
    pub fn set_display_name<T: Into<String>>(mut self, v: T) -> Self {
        self.display_name = v.into();
        self
    }

    /// Sets the value of [metadata_schema_uri][Dataset::metadata_schema_uri].
    pub fn set_metadata_schema_uri<T: Into<String>>(mut self, v: T) -> Self {
        self.metadata_schema_uri = v.into();
        self
    }

    /// Sets the value of [etag][Dataset::etag].
    pub fn set_etag<T: Into<String>>(mut self, v: T) -> Self {
        self.etag = v.into();
        self
    }

    /// Sets the value of [labels][Dataset::labels].
    pub fn set_labels<T, K, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.labels = v.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Sets the value of [description][Dataset::description].
    pub fn set_description<T: Into<String>>(mut self, v: T) -> Self {
        self.description = v.into();
        self
    }
}

impl wkt::message::Message for Dataset {
    fn typename() -> &'static str {
        "type.googleapis.com/google.cloud.aiplatform.v1beta1.Dataset"
    }
}

/// The request message for `DatasetService.GetDataset`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetDatasetRequest {
    /// The name of the dataset resource.
    #[prost(string, tag = "1")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl GetDatasetRequest {
    /// Sets the value of [name][GetDatasetRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

impl wkt::message::Message for GetDatasetRequest {
    fn typename() -> &'static str {
        "type.googleapis.com/google.cloud.aiplatform.v1beta1.GetDatasetRequest"
    }
}

/// The request message for `DatasetService.ListDatasets`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListDatasetsRequest {
    /// The location to list the datasets from, in
    /// `projects/{project}/locations/{location}` format.
    #[prost(string, tag = "1")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent: String,

    /// An expression for filtering the results of the request.
    #[prost(string, tag = "2")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter: String,

    /// The standard list page size.
    #[prost(int32, tag = "3")]
    #[serde(skip_serializing_if = "is_default")]
    pub page_size: i32,

    /// The standard list page token.
    #[prost(string, tag = "4")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub page_token: String,

    /// A comma-separated list of fields to order by, sorted in ascending
    /// order. Use "desc" after a field name for descending.
    #[prost(string, tag = "6")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub order_by: String,
}

impl ListDatasetsRequest {
    /// Sets the value of [parent][ListDatasetsRequest::parent].
    pub fn set_parent<T: Into<String>>(mut self, v: T) -> Self {
        self.parent = v.into();
        self
    }

    /// Sets the value of [filter][ListDatasetsRequest::filter].
    pub fn set_filter<T: Into<String>>(mut self, v: T) -> Self {
        self.filter = v.into();
        self
    }

    /// Sets the value of [page_size][ListDatasetsRequest::page_size].
    pub fn set_page_size<T: Into<i32>>(mut self, v: T) -> Self {
        self.page_size = v.into();
        self
    }

    /// Sets the value of [page_token][ListDatasetsRequest::page_token].
    pub fn set_page_token<T: Into<String>>(mut self, v: T) -> Self {
        self.page_token = v.into();
        self
    }

    /// Sets the value of [order_by][ListDatasetsRequest::order_by].
    pub fn set_order_by<T: Into<String>>(mut self, v: T) -> Self {
        self.order_by = v.into();
        self
    }
}

impl wkt::message::Message for ListDatasetsRequest {
    fn typename() -> &'static str {
        "type.googleapis.com/google.cloud.aiplatform.v1beta1.ListDatasetsRequest"
    }
}

/// The response message for `DatasetService.ListDatasets`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListDatasetsResponse {
    /// A list of datasets that matches the specified filter in the request.
    #[prost(message, repeated, tag = "1")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub datasets: Vec<Dataset>,

    /// The standard list next-page token.
    #[prost(string, tag = "2")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub next_page_token: String,
}

impl ListDatasetsResponse {
    /// Sets the value of [datasets][ListDatasetsResponse::datasets].
    pub fn set_datasets<T, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<Dataset>,
    {
        self.datasets = v.into_iter().map(|i| i.into()).collect();
        self
    }

    /// Sets the value of [next_page_token][ListDatasetsResponse::next_page_token].
    pub fn set_next_page_token<T: Into<String>>(mut self, v: T) -> Self {
        self.next_page_token = v.into();
        self
    }
}

impl wkt::message::Message for ListDatasetsResponse {
    fn typename() -> &'static str {
        "type.googleapis.com/google.cloud.aiplatform.v1beta1.ListDatasetsResponse"
    }
}

impl PageableResponse for ListDatasetsResponse {
    type PageItem = Dataset;

    fn items(self) -> Vec<Self::PageItem> {
        self.datasets
    }

    fn next_page_token(&self) -> String {
        self.next_page_token.clone()
    }
}

/// The request message for `DatasetService.CreateDataset`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateDatasetRequest {
    /// The location to create the dataset in, in
    /// `projects/{project}/locations/{location}` format.
    #[prost(string, tag = "1")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent: String,

    /// The dataset to create.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<Dataset>,
}

impl CreateDatasetRequest {
    /// Sets the value of [parent][CreateDatasetRequest::parent].
    pub fn set_parent<T: Into<String>>(mut self, v: T) -> Self {
        self.parent = v.into();
        self
    }

    /// Sets the value of [dataset][CreateDatasetRequest::dataset].
    pub fn set_dataset<T: Into<Dataset>>(mut self, v: T) -> Self {
        self.dataset = Some(v.into());
        self
    }

    /// Sets or clears the value of [dataset][CreateDatasetRequest::dataset].
    pub fn set_or_clear_dataset<T: Into<Dataset>>(mut self, v: Option<T>) -> Self {
        self.dataset = v.map(|x| x.into());
        self
    }
}

impl wkt::message::Message for CreateDatasetRequest {
    fn typename() -> &'static str {
        "type.googleapis.com/google.cloud.aiplatform.v1beta1.CreateDatasetRequest"
    }
}

/// The request message for `DatasetService.DeleteDataset`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteDatasetRequest {
    /// The name of the dataset resource to be deleted.
    #[prost(string, tag = "1")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl DeleteDatasetRequest {
    /// Sets the value of [name][DeleteDatasetRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

impl wkt::message::Message for DeleteDatasetRequest {
    fn typename() -> &'static str {
        "type.googleapis.com/google.cloud.aiplatform.v1beta1.DeleteDatasetRequest"
    }
}

/// Metadata common to all the Vertex AI long-running operations.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenericOperationMetadata {
    /// Partial failures encountered, e.g. single files that could not be
    /// read. Output only.
    #[prost(message, repeated, tag = "1")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partial_failures: Vec<wkt::Status>,
}

impl GenericOperationMetadata {
    /// Sets the value of [partial_failures][GenericOperationMetadata::partial_failures].
    pub fn set_partial_failures<T, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<wkt::Status>,
    {
        self.partial_failures = v.into_iter().map(|i| i.into()).collect();
        self
    }
}

impl wkt::message::Message for GenericOperationMetadata {
    fn typename() -> &'static str {
        "type.googleapis.com/google.cloud.aiplatform.v1beta1.GenericOperationMetadata"
    }
}

/// Runtime operation information for `DatasetService.CreateDataset`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateDatasetOperationMetadata {
    /// The operation generic information.
    #[prost(message, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_metadata: Option<GenericOperationMetadata>,
}

impl CreateDatasetOperationMetadata {
    /// Sets the value of [generic_metadata][CreateDatasetOperationMetadata::generic_metadata].
    pub fn set_generic_metadata<T: Into<GenericOperationMetadata>>(mut self, v: T) -> Self {
        self.generic_metadata = Some(v.into());
        self
    }
}

impl wkt::message::Message for CreateDatasetOperationMetadata {
    fn typename() -> &'static str {
        "type.googleapis.com/google.cloud.aiplatform.v1beta1.CreateDatasetOperationMetadata"
    }
}

/// Details of operations that perform deletes of any entities.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteOperationMetadata {
    /// The common part of the operation metadata.
    #[prost(message, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_metadata: Option<GenericOperationMetadata>,
}

impl DeleteOperationMetadata {
    /// Sets the value of [generic_metadata][DeleteOperationMetadata::generic_metadata].
    pub fn set_generic_metadata<T: Into<GenericOperationMetadata>>(mut self, v: T) -> Self {
        self.generic_metadata = Some(v.into());
        self
    }
}

impl wkt::message::Message for DeleteOperationMetadata {
    fn typename() -> &'static str {
        "type.googleapis.com/google.cloud.aiplatform.v1beta1.DeleteOperationMetadata"
    }
}

fn is_default<T: Default + PartialEq>(v: &T) -> bool {
    *v == T::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wkt::message::Message;

    #[test]
    fn dataset_json() -> anyhow::Result<()> {
        let dataset = Dataset::default()
            .set_name("projects/p/locations/l/datasets/d")
            .set_display_name("my dataset")
            .set_labels([("env", "test")]);
        let got = serde_json::to_value(&dataset)?;
        let want = json!({
            "name": "projects/p/locations/l/datasets/d",
            "displayName": "my dataset",
            "labels": {"env": "test"},
        });
        assert_eq!(got, want);
        let back = serde_json::from_value::<Dataset>(got)?;
        assert_eq!(back, dataset);
        Ok(())
    }

    #[test]
    fn list_request_json() -> anyhow::Result<()> {
        let request = ListDatasetsRequest::default()
            .set_parent("projects/p/locations/l")
            .set_page_size(10)
            .set_order_by("displayName desc");
        let got = serde_json::to_value(&request)?;
        let want = json!({
            "parent": "projects/p/locations/l",
            "pageSize": 10,
            "orderBy": "displayName desc",
        });
        assert_eq!(got, want);
        Ok(())
    }

    #[test]
    fn list_response_pages() {
        let response = ListDatasetsResponse::default()
            .set_datasets([Dataset::default().set_name("a"), Dataset::default().set_name("b")])
            .set_next_page_token("t1");
        assert_eq!(response.next_page_token(), "t1");
        let names = response.items().into_iter().map(|d| d.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn metadata_in_any() -> anyhow::Result<()> {
        let metadata = CreateDatasetOperationMetadata::default().set_generic_metadata(
            GenericOperationMetadata::default().set_partial_failures([wkt::Status::default()]),
        );
        let any = wkt::Any::from_msg(&metadata)?;
        assert_eq!(any.type_url(), CreateDatasetOperationMetadata::typename());
        let got = any.to_msg::<CreateDatasetOperationMetadata>()?;
        assert_eq!(got, metadata);
        Ok(())
    }

    #[test]
    fn typenames() {
        assert_eq!(
            GetDatasetRequest::typename(),
            "type.googleapis.com/google.cloud.aiplatform.v1beta1.GetDatasetRequest"
        );
        assert_eq!(
            Dataset::typename(),
            "type.googleapis.com/google.cloud.aiplatform.v1beta1.Dataset"
        );
    }
}
