use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_common::{ApiError, Error, Result};

use super::{kind, new_id, SimulatedCloud};
use crate::api::servicecatalog::*;

#[derive(Debug, Serialize, Deserialize)]
struct StoredConstraint {
    detail: ConstraintDetail,
    parameters: String,
    idempotency_token: String,
}

fn constraint_not_found(id: &str) -> Error {
    ApiError::not_found(
        ERR_RESOURCE_NOT_FOUND,
        format!("Constraint {} not found", id),
    )
    .into()
}

fn check_accept_language(accept_language: &str) -> Result<()> {
    if !accept_language.is_empty() && !ACCEPT_LANGUAGES.contains(&accept_language) {
        return Err(ApiError::validation(
            ERR_INVALID_PARAMETERS,
            format!("Unsupported AcceptLanguage {}", accept_language),
        )
        .into());
    }
    Ok(())
}

fn check_parameters(parameters: &str) -> Result<()> {
    serde_json::from_str::<serde_json::Value>(parameters).map_err(|e| {
        Error::from(ApiError::validation(
            ERR_INVALID_PARAMETERS,
            format!("Parameters are not valid JSON: {}", e),
        ))
    })?;
    Ok(())
}

impl SimulatedCloud {
    fn constraint_output(&self, id: &str) -> Result<DescribeConstraintOutput> {
        let row = self
            .observe::<StoredConstraint>(kind::SERVICECATALOG_CONSTRAINT, id)?
            .ok_or_else(|| constraint_not_found(id))?;
        Ok(DescribeConstraintOutput {
            constraint_detail: row.body.detail,
            constraint_parameters: row.body.parameters,
            status: row.status,
        })
    }
}

#[async_trait]
impl ServiceCatalogApi for SimulatedCloud {
    async fn create_constraint(
        &self,
        input: &CreateConstraintInput,
    ) -> Result<DescribeConstraintOutput> {
        self.enter("CreateConstraint")?;
        check_accept_language(input.accept_language.as_deref().unwrap_or(""))?;
        check_parameters(&input.parameters)?;
        if !CONSTRAINT_TYPES.contains(&input.constraint_type.as_str()) {
            return Err(ApiError::validation(
                ERR_INVALID_PARAMETERS,
                format!("Unsupported constraint type {}", input.constraint_type),
            )
            .into());
        }

        let existing = self
            .db
            .list::<StoredConstraint>(kind::SERVICECATALOG_CONSTRAINT)?
            .into_iter()
            .find(|row| row.body.idempotency_token == input.idempotency_token);
        if let Some(row) = existing {
            return Ok(DescribeConstraintOutput {
                constraint_detail: row.body.detail,
                constraint_parameters: row.body.parameters,
                status: row.status,
            });
        }

        let detail = ConstraintDetail {
            constraint_id: new_id("cons"),
            constraint_type: input.constraint_type.clone(),
            description: input.description.clone().unwrap_or_default(),
            owner: self.account_id.clone(),
            portfolio_id: input.portfolio_id.clone(),
            product_id: input.product_id.clone(),
        };
        let stored = StoredConstraint {
            detail: detail.clone(),
            parameters: input.parameters.clone(),
            idempotency_token: input.idempotency_token.clone(),
        };
        self.db.insert(
            kind::SERVICECATALOG_CONSTRAINT,
            &detail.constraint_id,
            "",
            &stored,
            status::CREATING,
            Some(&self.settling(status::AVAILABLE)),
        )?;

        Ok(DescribeConstraintOutput {
            constraint_detail: detail,
            constraint_parameters: input.parameters.clone(),
            status: status::CREATING.to_string(),
        })
    }

    async fn describe_constraint(
        &self,
        accept_language: &str,
        id: &str,
    ) -> Result<DescribeConstraintOutput> {
        self.enter("DescribeConstraint")?;
        check_accept_language(accept_language)?;
        self.constraint_output(id)
    }

    async fn update_constraint(
        &self,
        input: &UpdateConstraintInput,
    ) -> Result<DescribeConstraintOutput> {
        self.enter("UpdateConstraint")?;
        check_accept_language(input.accept_language.as_deref().unwrap_or(""))?;
        let row = self
            .db
            .get::<StoredConstraint>(kind::SERVICECATALOG_CONSTRAINT, &input.id)?
            .ok_or_else(|| constraint_not_found(&input.id))?;

        let mut stored = row.body;
        if let Some(description) = &input.description {
            stored.detail.description = description.clone();
        }
        if let Some(parameters) = &input.parameters {
            check_parameters(parameters)?;
            stored.parameters = parameters.clone();
        }
        self.db
            .update(kind::SERVICECATALOG_CONSTRAINT, &input.id, &stored)?;

        Ok(DescribeConstraintOutput {
            constraint_detail: stored.detail,
            constraint_parameters: stored.parameters,
            status: row.status,
        })
    }

    async fn delete_constraint(&self, accept_language: &str, id: &str) -> Result<()> {
        self.enter("DeleteConstraint")?;
        check_accept_language(accept_language)?;
        let row = self
            .db
            .get::<StoredConstraint>(kind::SERVICECATALOG_CONSTRAINT, id)?
            .ok_or_else(|| constraint_not_found(id))?;

        if row.transition.as_ref().map(|t| t.remove) != Some(true) {
            self.db.set_status(
                kind::SERVICECATALOG_CONSTRAINT,
                id,
                &row.status,
                Some(&self.vanishing(&row.status)),
            )?;
        }
        Ok(())
    }
}
