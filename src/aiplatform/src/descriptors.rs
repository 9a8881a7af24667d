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

//! The endpoint descriptors for the `DatasetService` RPCs.

use crate::model::*;
use gaxi::descriptor::{EndpointDescriptor, HttpBody, HttpRule, MethodKind};
use gaxi::operations::OperationsBindings;

pub(crate) const GET_DATASET: &str = "google.cloud.aiplatform.v1beta1.DatasetService/GetDataset";
pub(crate) const LIST_DATASETS: &str =
    "google.cloud.aiplatform.v1beta1.DatasetService/ListDatasets";
pub(crate) const CREATE_DATASET: &str =
    "google.cloud.aiplatform.v1beta1.DatasetService/CreateDataset";
pub(crate) const DELETE_DATASET: &str =
    "google.cloud.aiplatform.v1beta1.DatasetService/DeleteDataset";

const VERSION: &str = "v1beta1";

/// The resources owning operations in this service.
const OPERATION_COLLECTIONS: [&str; 6] = [
    "projects/*/locations/*",
    "projects/*/locations/*/datasets/*",
    "projects/*/locations/*/datasets/*/annotationSpecs/*",
    "projects/*/locations/*/datasets/*/dataItems/*",
    "projects/*/locations/*/datasets/*/dataItems/*/annotations/*",
    "projects/*/locations/*/datasets/*/savedQueries/*",
];

lazy_static::lazy_static! {
    pub(crate) static ref GET: EndpointDescriptor =
        EndpointDescriptor::new::<GetDatasetRequest, Dataset>(GET_DATASET)
            .with_http(HttpRule::get(format!(
                "/{VERSION}/{{name=projects/*/locations/*/datasets/*}}"
            )))
            .with_routing(["name"])
            .with_idempotency(true);

    pub(crate) static ref LIST: EndpointDescriptor =
        EndpointDescriptor::new::<ListDatasetsRequest, ListDatasetsResponse>(LIST_DATASETS)
            .with_kind(MethodKind::Paged { items_field: "datasets" })
            .with_http(HttpRule::get(format!(
                "/{VERSION}/{{parent=projects/*/locations/*}}/datasets"
            )))
            .with_routing(["parent"])
            .with_idempotency(true);

    pub(crate) static ref CREATE: EndpointDescriptor =
        EndpointDescriptor::new::<CreateDatasetRequest, lro::Operation>(CREATE_DATASET)
            .with_kind(MethodKind::LongRunning {
                response_type: "google.cloud.aiplatform.v1beta1.Dataset",
                metadata_type: "google.cloud.aiplatform.v1beta1.CreateDatasetOperationMetadata",
            })
            .with_http(
                HttpRule::post(format!("/{VERSION}/{{parent=projects/*/locations/*}}/datasets"))
                    .with_body(HttpBody::Field("dataset")),
            )
            .with_routing(["parent"]);

    pub(crate) static ref DELETE: EndpointDescriptor =
        EndpointDescriptor::new::<DeleteDatasetRequest, lro::Operation>(DELETE_DATASET)
            .with_kind(MethodKind::LongRunning {
                response_type: "google.protobuf.Empty",
                metadata_type: "google.cloud.aiplatform.v1beta1.DeleteOperationMetadata",
            })
            .with_http(HttpRule::delete(format!(
                "/{VERSION}/{{name=projects/*/locations/*/datasets/*}}"
            )))
            .with_routing(["name"]);
}

pub(crate) fn operations() -> OperationsBindings {
    OperationsBindings::generate(VERSION, &OPERATION_COLLECTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&GET, "GetDataset", true, "name")]
    #[test_case(&LIST, "ListDatasets", true, "parent")]
    #[test_case(&CREATE, "CreateDataset", false, "parent")]
    #[test_case(&DELETE, "DeleteDataset", false, "name")]
    fn descriptors(d: &EndpointDescriptor, method: &str, idempotent: bool, routing: &str) {
        assert_eq!(d.service(), "google.cloud.aiplatform.v1beta1.DatasetService");
        assert_eq!(d.method(), method);
        assert_eq!(d.idempotent, idempotent, "{d:?}");
        assert_eq!(d.routing_fields, vec![routing]);
        let rule = d.http.as_ref().expect("every dataset RPC has an HTTP rule");
        let template = rule.path_template().expect("the URI template is valid");
        assert_eq!(template.fields(), vec![routing]);
    }

    #[test]
    fn create_body() {
        let rule = CREATE.http.as_ref().expect("CreateDataset has an HTTP rule");
        assert_eq!(rule.method, http::Method::POST);
        assert_eq!(rule.body, HttpBody::Field("dataset"));
    }

    #[test]
    fn operations_bindings() {
        let bindings = operations();
        let rule = bindings.get.http.as_ref().expect("GetOperation has an HTTP rule");
        let templates = rule
            .bindings()
            .map(|r| r.uri_template.as_str())
            .collect::<Vec<_>>();
        assert_eq!(templates.len(), OPERATION_COLLECTIONS.len());
        assert_eq!(
            templates[0],
            "/v1beta1/{name=projects/*/locations/*/operations/*}"
        );
        assert!(
            templates.contains(&"/v1beta1/{name=projects/*/locations/*/datasets/*/operations/*}"),
            "{templates:?}"
        );
    }
}
