//! Type-level operations on a model's REST collection.
//!
//! Every operation takes the path arguments for the base template
//! explicitly (an empty slice when the base has no placeholders) and issues
//! exactly one request.

use std::sync::Arc;

use serde_json::Value;

use crate::error::ModelError;
use crate::model::{Instance, Model};
use crate::response;

impl Model {
    /// `GET base/:id`, decoded into an instance.
    ///
    /// The id and path arguments are not percent-encoded. A value that is not
    /// a valid path segment surfaces as `ModelError::Transport`.
    pub fn get(self: &Arc<Self>, path_args: &[Value], id: impl Into<Value>) -> Result<Instance, ModelError> {
        let rest = self.rest()?;
        let request = rest.resource().build_get(path_args, &id.into());
        let response = rest.send(request)?;
        self.instance_from(response::decode(&response)?)
    }

    /// `GET base`, decoded into instances in server order.
    pub fn get_all(self: &Arc<Self>, path_args: &[Value]) -> Result<Vec<Instance>, ModelError> {
        let rest = self.rest()?;
        let response = rest.send(rest.resource().build_list(path_args))?;
        let records: Vec<Value> = response::decode(&response)?;
        records
            .into_iter()
            .map(|record| self.instance_from(record))
            .collect()
    }

    /// `DELETE base/:id`.
    pub fn remove(&self, path_args: &[Value], id: impl Into<Value>) -> Result<(), ModelError> {
        let rest = self.rest()?;
        let resource = rest.resource();
        let request = resource.build_delete(resource.member_path(path_args, &id.into()));
        rest.send(request)?;
        Ok(())
    }

    /// `DELETE base`. The empty collection returned stands for "all removed".
    pub fn remove_all(&self, path_args: &[Value]) -> Result<Vec<Instance>, ModelError> {
        let rest = self.rest()?;
        rest.send(rest.resource().build_delete_all(path_args))?;
        Ok(Vec::new())
    }
}
