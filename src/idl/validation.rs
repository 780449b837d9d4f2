//! Optional consistency checks for a parsed interface.
//!
//! The parser accepts duplicate struct fields, dangling alias references and
//! self-referential aliases. `validate` reports them for callers that want
//! to reject such interfaces up front.

use std::collections::HashSet;

use thiserror::Error;

use super::{Interface, Member, Type};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate field `{field}` in `{member}`")]
    DuplicateField { member: String, field: String },
    #[error("`{member}` refers to undefined type `{alias}`")]
    UndefinedAlias { member: String, alias: String },
    #[error("type `{0}` contains itself without an array in between")]
    RecursiveAlias(String),
}

impl Interface {
    /// Check for duplicate struct fields, undefined aliases and alias cycles
    /// that would make [`Interface::default_value`] recurse forever.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for member in self.members() {
            let types: Vec<&Type> = match member {
                Member::Alias(alias) => vec![&alias.ty],
                Member::Method(method) => vec![&method.input, &method.output],
                Member::Error(error) => error.payload.iter().collect(),
            };
            for ty in types {
                self.check_type(member.name(), ty)?;
            }
        }

        let mut acyclic = HashSet::new();
        for alias in self.aliases() {
            let mut path = vec![alias.name.as_str()];
            self.check_cycle(&alias.ty, &mut path, &mut acyclic)?;
        }

        Ok(())
    }

    fn check_type(&self, member: &str, ty: &Type) -> Result<(), ValidationError> {
        match ty {
            Type::Array(element) => self.check_type(member, element),
            Type::Struct(fields) => {
                let mut seen = HashSet::new();
                for field in fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(ValidationError::DuplicateField {
                            member: member.to_string(),
                            field: field.name.clone(),
                        });
                    }
                    self.check_type(member, &field.ty)?;
                }
                Ok(())
            }
            Type::Alias(name) if self.alias(name).is_none() => {
                Err(ValidationError::UndefinedAlias {
                    member: member.to_string(),
                    alias: name.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Arrays default to `[]` without looking at their element type, so
    /// only struct fields and direct alias references can form a cycle.
    fn check_cycle<'a>(
        &'a self,
        ty: &'a Type,
        path: &mut Vec<&'a str>,
        acyclic: &mut HashSet<&'a str>,
    ) -> Result<(), ValidationError> {
        match ty {
            Type::Struct(fields) => {
                for field in fields {
                    self.check_cycle(&field.ty, path, acyclic)?;
                }
                Ok(())
            }
            Type::Alias(name) => {
                if path.contains(&name.as_str()) {
                    return Err(ValidationError::RecursiveAlias(name.clone()));
                }
                if acyclic.contains(name.as_str()) {
                    return Ok(());
                }
                let Some(alias) = self.alias(name) else {
                    return Ok(());
                };
                path.push(name);
                self.check_cycle(&alias.ty, path, acyclic)?;
                path.pop();
                acyclic.insert(name);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
