use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Table};
use prodcat::permissions::allowed_actions;
use prodcat::{Action, Resource, Role, authorize, has_permission};
use serde::Serialize;

use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::{ICONS, THEME};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Check",
        commands: &[
            "prodcat permissions check SUPER_ADMIN manage organizations",
            "prodcat permissions check MEMBER delete users    # exits 1: access denied",
        ],
    },
    ExampleGroup {
        title: "Table",
        commands: &[
            "prodcat permissions table               # Every role",
            "prodcat permissions table ORG_ADMIN",
        ],
    },
];

#[derive(Subcommand)]
pub enum PermissionCommands {
    /// Check whether a role may perform an action on a resource
    #[command(name = "check")]
    Check {
        /// SUPER_ADMIN, ORG_ADMIN or MEMBER
        role: String,
        /// view, create, edit, delete or manage
        action: String,
        /// organizations, users, invitations, products, categories, fields or settings
        resource: String,
    },

    /// Show the permission table
    #[command(name = "table")]
    Table {
        /// Limit to one role
        role: Option<String>,
    },
}

pub fn handle_permission_commands(command: PermissionCommands, output: &OutputManager) -> Result<()> {
    match command {
        PermissionCommands::Check { role, action, resource } => {
            let role: Role = role.parse().context("Invalid role")?;
            let action: Action = action.parse().context("Invalid action")?;
            let resource: Resource = resource.parse().context("Invalid resource")?;

            let decision = Decision {
                role,
                action,
                resource,
                allowed: has_permission(role, action, resource),
            };
            if output.is_json() {
                output.display(&decision)?;
            } else if decision.allowed {
                output.success(&format!("{role} may {action} {resource}"));
            }
            authorize(role, action, resource)?;
        }
        PermissionCommands::Table { role } => {
            let roles = match role {
                Some(role) => vec![role.parse::<Role>().context("Invalid role")?],
                None => Role::ALL.to_vec(),
            };
            for role in roles {
                output.heading(role.as_str());
                output.display(&RoleMatrix { role })?;
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Decision {
    role: Role,
    action: Action,
    resource: Resource,
    allowed: bool,
}

impl TableDisplay for Decision {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Role", "Action", "Resource", "Allowed"]);
        table.add_row(vec![
            Cell::new(self.role),
            Cell::new(self.action),
            Cell::new(self.resource),
            Cell::new(self.allowed),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        format!("{} {} {} {}", self.role, self.action, self.resource, self.allowed)
    }
}

struct RoleMatrix {
    role: Role,
}

impl Serialize for RoleMatrix {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Resource::ALL.len()))?;
        for resource in Resource::ALL {
            map.serialize_entry(resource.as_str(), &allowed_actions(self.role, resource))?;
        }
        map.end()
    }
}

impl TableDisplay for RoleMatrix {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        let mut headers = vec!["Resource"];
        headers.extend(Action::ALL.iter().map(|action| action.as_str()));
        output.add_table_header(&mut table, &headers);

        for resource in Resource::ALL {
            let mut row = vec![Cell::new(resource)];
            for action in Action::ALL {
                let (mark, color) = if has_permission(self.role, action, resource) {
                    (ICONS.allowed, THEME.allowed)
                } else {
                    (ICONS.denied, THEME.denied)
                };
                if output.options.no_color {
                    row.push(Cell::new(mark));
                } else {
                    row.push(Cell::new(mark.color(color)));
                }
            }
            table.add_row(row);
        }
        table
    }

    fn to_compact(&self) -> String {
        Resource::ALL
            .iter()
            .map(|resource| {
                let actions: Vec<&str> = allowed_actions(self.role, *resource).iter().map(Action::as_str).collect();
                format!("{resource}={}", actions.join(","))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
