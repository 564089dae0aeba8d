use crate::commands::{analyze, config, details, permissions, registry};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "registry",
            groups: registry::EXAMPLES,
        },
        CommandExample {
            name: "analyze",
            groups: analyze::EXAMPLES,
        },
        CommandExample {
            name: "details",
            groups: details::EXAMPLES,
        },
        CommandExample {
            name: "permissions",
            groups: permissions::EXAMPLES,
        },
        CommandExample {
            name: "config",
            groups: config::EXAMPLES,
        },
    ]
}
