//! Depth-first assembly of the report tree.
//!
//! The walk visits modules in source order and, inside each module, exported types sorted by
//! full name. Each type contributes its exported fields sorted by name, then its exported
//! methods sorted by name; parameters keep declaration order. All sorting is ordinal and
//! stable, so the tree depends only on the metadata graph and the namespace constraint, never
//! on the order in which the source enumerates it.

use crate::{
    filter::ExportFilter,
    metadata::{FieldMetadata, MetadataSource, MethodMetadata, ModuleMetadata, TypeMetadata},
    naming::simplify,
    report::{ReportNode, ASSEMBLY_TAG, FIELD_TAG, METHOD_TAG, PARAMETER_TAG, TYPE_TAG},
    runlog::EventLog,
    Result,
};

/// Builds a [`ReportNode`] tree from a metadata source.
///
/// # Examples
///
/// ```rust
/// use asminspect::{
///     filter::ExportFilter,
///     metadata::{AssemblyMetadata, ModuleMetadata, TypeMetadata, Visibility},
///     report::ReportBuilder,
///     runlog::MemoryLog,
/// };
///
/// let assembly = AssemblyMetadata::new("Game").with_module(
///     ModuleMetadata::new("Game.dll")
///         .with_type(TypeMetadata::new("Game", "Player", Visibility::Public)),
/// );
///
/// let mut log = MemoryLog::new();
/// let report = ReportBuilder::new(ExportFilter::new(None), &mut log)
///     .build(&assembly)
///     .unwrap();
///
/// assert_eq!(report.attribute("Name"), Some("Game"));
/// assert_eq!(report.children()[0].attribute("FullName"), Some("Game.Player"));
/// ```
pub struct ReportBuilder<'a> {
    filter: ExportFilter<'a>,
    log: &'a mut dyn EventLog,
}

impl<'a> ReportBuilder<'a> {
    /// Create a builder that reports progress to `log`.
    pub fn new(filter: ExportFilter<'a>, log: &'a mut dyn EventLog) -> Self {
        ReportBuilder { filter, log }
    }

    /// Walk `source` and return the finished tree.
    ///
    /// # Errors
    /// Propagates errors from the metadata source and from the event log.
    pub fn build<S: MetadataSource + ?Sized>(mut self, source: &S) -> Result<ReportNode> {
        let mut root =
            ReportNode::new(ASSEMBLY_TAG).with_attribute("Name", source.assembly_name()?);

        for module in source.modules()? {
            let types = self.module(&module)?;
            root = root.with_children(types);
        }

        Ok(root)
    }

    fn module(&mut self, module: &ModuleMetadata) -> Result<Vec<ReportNode>> {
        self.log.info(&format!("Processing module: {}", module.name))?;

        let filter = self.filter;
        let mut exported: Vec<(String, &TypeMetadata)> = module
            .types
            .iter()
            .filter(|t| {
                let keep = filter.is_exported_type(t);
                if !keep {
                    log::debug!("skipping type {}", t.full_name());
                }
                keep
            })
            .map(|t| (t.full_name(), t))
            .collect();
        exported.sort_by(|(a, _), (b, _)| a.cmp(b));

        exported
            .into_iter()
            .map(|(full_name, type_metadata)| self.type_node(full_name, type_metadata))
            .collect()
    }

    fn type_node(&mut self, full_name: String, type_metadata: &TypeMetadata) -> Result<ReportNode> {
        self.log.info(&format!("Processing type: {full_name}"))?;

        let mut node = ReportNode::new(TYPE_TAG)
            .with_attribute("Namespace", type_metadata.namespace.as_str())
            .with_attribute("FullName", full_name);

        let mut fields: Vec<&FieldMetadata> = type_metadata
            .fields
            .iter()
            .filter(|f| self.filter.is_exported_field(f))
            .collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));

        for field in fields {
            self.log.info(&format!("Found public field: {}", field.name))?;
            node = node.with_child(
                ReportNode::new(FIELD_TAG)
                    .with_attribute("Name", field.name.as_str())
                    .with_attribute("Type", simplify(&field.type_name)),
            );
        }

        let mut methods: Vec<&MethodMetadata> = type_metadata
            .methods
            .iter()
            .filter(|m| self.filter.is_exported_method(m))
            .collect();
        methods.sort_by(|a, b| a.name.cmp(&b.name));

        for method in methods {
            self.log.info(&format!("Found public method: {}", method.name))?;
            node = node.with_child(method_node(method));
        }

        Ok(node)
    }
}

fn method_node(method: &MethodMetadata) -> ReportNode {
    ReportNode::new(METHOD_TAG)
        .with_attribute("Name", method.name.as_str())
        .with_attribute("ReturnType", simplify(&method.return_type))
        .with_children(method.parameters.iter().map(|parameter| {
            ReportNode::new(PARAMETER_TAG)
                .with_attribute("Name", parameter.name.as_str())
                .with_attribute("Type", simplify(&parameter.type_name))
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{AccessorKind, AssemblyMetadata, ParameterMetadata, Visibility},
        runlog::MemoryLog,
    };

    fn sample() -> AssemblyMetadata {
        let player = TypeMetadata::new("Game", "Player", Visibility::Public)
            .with_field(FieldMetadata::new("speed", "System.Single", Visibility::Public))
            .with_field(FieldMetadata::new("Health", "System.Int32", Visibility::Public))
            .with_field(FieldMetadata::new(
                "<Name>k__BackingField",
                "System.String",
                Visibility::Private,
            ))
            .with_method(
                MethodMetadata::new("Move", "System.Void", Visibility::Public)
                    .with_parameter(ParameterMetadata::new("z", "System.Single"))
                    .with_parameter(ParameterMetadata::new("a", "System.Single")),
            )
            .with_method(MethodMetadata::new(
                "Attack",
                "System.Boolean",
                Visibility::Public,
            ))
            .with_method(
                MethodMetadata::new("get_Name", "System.String", Visibility::Public)
                    .with_accessor(AccessorKind::Getter),
            );

        AssemblyMetadata::new("Game").with_module(
            ModuleMetadata::new("Game.dll")
                .with_type(TypeMetadata::new("Game", "Zombie", Visibility::Public))
                .with_type(player)
                .with_type(TypeMetadata::new("", "<Module>", Visibility::Internal))
                .with_type(TypeMetadata::new("Game", "Hidden", Visibility::Internal)),
        )
    }

    #[test]
    fn builds_sorted_tree() {
        let mut log = MemoryLog::new();
        let report = ReportBuilder::new(ExportFilter::new(None), &mut log)
            .build(&sample())
            .unwrap();

        assert_eq!(report.tag(), ASSEMBLY_TAG);
        assert_eq!(report.attribute("Name"), Some("Game"));

        let types: Vec<_> = report
            .children()
            .iter()
            .filter_map(|t| t.attribute("FullName"))
            .collect();
        assert_eq!(types, ["Game.Player", "Game.Zombie"]);

        let player = &report.children()[0];
        assert_eq!(player.attribute("Namespace"), Some("Game"));

        let members: Vec<_> = player
            .children()
            .iter()
            .map(|c| (c.tag(), c.attribute("Name").unwrap()))
            .collect();
        // Ordinal order puts upper case first
        assert_eq!(
            members,
            [
                (FIELD_TAG, "Health"),
                (FIELD_TAG, "speed"),
                (METHOD_TAG, "Attack"),
                (METHOD_TAG, "Move"),
            ]
        );

        let health = &player.children()[0];
        assert_eq!(health.attribute("Type"), Some("Int32"));

        let movement = &player.children()[3];
        assert_eq!(movement.attribute("ReturnType"), Some("Void"));
        let params: Vec<_> = movement
            .children_tagged(PARAMETER_TAG)
            .map(|p| (p.attribute("Name").unwrap(), p.attribute("Type").unwrap()))
            .collect();
        assert_eq!(params, [("z", "Single"), ("a", "Single")]);
    }

    #[test]
    fn records_progress_events() {
        let mut log = MemoryLog::new();
        ReportBuilder::new(ExportFilter::new(None), &mut log)
            .build(&sample())
            .unwrap();

        let messages: Vec<_> = log.messages().collect();
        assert_eq!(
            messages,
            [
                "Processing module: Game.dll",
                "Processing type: Game.Player",
                "Found public field: Health",
                "Found public field: speed",
                "Found public method: Attack",
                "Found public method: Move",
                "Processing type: Game.Zombie",
            ]
        );
    }

    #[test]
    fn namespace_constraint_without_match() {
        let mut log = MemoryLog::new();
        let report = ReportBuilder::new(ExportFilter::new(Some("Foo.Bar")), &mut log)
            .build(&sample())
            .unwrap();

        assert_eq!(report.attribute("Name"), Some("Game"));
        assert!(report.children().is_empty());
    }

    #[test]
    fn modules_are_walked_in_order() {
        let assembly = AssemblyMetadata::new("Multi")
            .with_module(
                ModuleMetadata::new("Second.netmodule")
                    .with_type(TypeMetadata::new("B", "Beta", Visibility::Public)),
            )
            .with_module(
                ModuleMetadata::new("First.netmodule")
                    .with_type(TypeMetadata::new("A", "Alpha", Visibility::Public)),
            );

        let mut log = MemoryLog::new();
        let report = ReportBuilder::new(ExportFilter::new(None), &mut log)
            .build(&assembly)
            .unwrap();

        let types: Vec<_> = report
            .children()
            .iter()
            .filter_map(|t| t.attribute("FullName"))
            .collect();
        assert_eq!(types, ["B.Beta", "A.Alpha"]);
    }

    #[test]
    fn global_namespace_is_an_empty_attribute() {
        let assembly = AssemblyMetadata::new("Tool").with_module(
            ModuleMetadata::new("Tool.dll")
                .with_type(TypeMetadata::new("", "Program", Visibility::Public)),
        );

        let mut log = MemoryLog::new();
        let report = ReportBuilder::new(ExportFilter::new(None), &mut log)
            .build(&assembly)
            .unwrap();

        let program = &report.children()[0];
        assert_eq!(program.attribute("Namespace"), Some(""));
        assert_eq!(program.attribute("FullName"), Some("Program"));
    }
}
