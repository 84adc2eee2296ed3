use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::{ApiError, Error, Result};

use super::{kind, SimulatedCloud};
use crate::api::dax::*;

/// Parameters every new group starts with
const DEFAULT_PARAMETERS: &[(&str, &str)] = &[
    ("query-ttl-millis", "300000"),
    ("record-ttl-millis", "300000"),
];

#[derive(Debug, Serialize, Deserialize)]
struct StoredParameterGroup {
    group: ParameterGroup,
    parameters: Vec<Parameter>,
}

fn group_not_found(name: &str) -> Error {
    ApiError::not_found(
        ERR_PARAMETER_GROUP_NOT_FOUND,
        format!("Parameter group {} not found", name),
    )
    .into()
}

impl SimulatedCloud {
    fn stored_parameter_group(&self, name: &str) -> Result<StoredParameterGroup> {
        self.db
            .get::<StoredParameterGroup>(kind::DAX_PARAMETER_GROUP, name)?
            .map(|row| row.body)
            .ok_or_else(|| group_not_found(name))
    }
}

#[async_trait]
impl DaxApi for SimulatedCloud {
    async fn create_parameter_group(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ParameterGroup> {
        self.enter("CreateParameterGroup")?;
        if self.db.exists(kind::DAX_PARAMETER_GROUP, name)? {
            return Err(ApiError::conflict(
                ERR_PARAMETER_GROUP_ALREADY_EXISTS,
                format!("Parameter group {} already exists", name),
            )
            .into());
        }

        let group = ParameterGroup {
            parameter_group_name: name.to_string(),
            description: description
                .filter(|d| !d.is_empty())
                .unwrap_or(" ")
                .to_string(),
        };
        let stored = StoredParameterGroup {
            group: group.clone(),
            parameters: DEFAULT_PARAMETERS
                .iter()
                .map(|(n, v)| Parameter {
                    parameter_name: n.to_string(),
                    parameter_value: v.to_string(),
                })
                .collect(),
        };
        self.db
            .insert(kind::DAX_PARAMETER_GROUP, name, name, &stored, "", None)?;
        Ok(group)
    }

    async fn describe_parameter_groups(&self, names: &[String]) -> Result<Vec<ParameterGroup>> {
        self.enter("DescribeParameterGroups")?;
        names
            .iter()
            .map(|name| self.stored_parameter_group(name).map(|s| s.group))
            .collect()
    }

    async fn describe_parameters(&self, name: &str) -> Result<Vec<Parameter>> {
        self.enter("DescribeParameters")?;
        Ok(self.stored_parameter_group(name)?.parameters)
    }

    async fn update_parameter_group(
        &self,
        name: &str,
        parameters: &[Parameter],
    ) -> Result<ParameterGroup> {
        self.enter("UpdateParameterGroup")?;
        let mut stored = self.stored_parameter_group(name)?;

        for p in parameters {
            match stored
                .parameters
                .iter_mut()
                .find(|existing| existing.parameter_name == p.parameter_name)
            {
                Some(existing) => existing.parameter_value = p.parameter_value.clone(),
                None => {
                    return Err(ApiError::validation(
                        ERR_INVALID_PARAMETER_VALUE,
                        format!("Unknown parameter {}", p.parameter_name),
                    )
                    .into())
                }
            }
        }

        self.db.update(kind::DAX_PARAMETER_GROUP, name, &stored)?;
        Ok(stored.group)
    }

    async fn delete_parameter_group(&self, name: &str) -> Result<()> {
        self.enter("DeleteParameterGroup")?;
        if !self.db.delete(kind::DAX_PARAMETER_GROUP, name)? {
            return Err(group_not_found(name));
        }
        Ok(())
    }
}
