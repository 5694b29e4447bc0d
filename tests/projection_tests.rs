//! Projection Tests
//!
//! Catalogue graphs from fixtures, projected into documents and resolved back.

use std::collections::BTreeSet;

use feature_catalogue::config::ExportConfig;
use feature_catalogue::graph::{CatalogueBuilder, CatalogueGraph, GraphFile, NodeIndex};
use feature_catalogue::model::{
    CatalogueBody, FeatureTypeBody, InheritanceBody, LinkKind, NodeKind, RoleType,
};
use feature_catalogue::projection::{
    project, resolve_document, Document, MissingIdentifierPolicy, ProjectedNode,
    ProjectionContext, ProjectionOptions,
};
use feature_catalogue::{CatalogueError, MissingIdentifierReason, NodeBody};

fn load(fixture: &str) -> CatalogueGraph {
    let (graph, _) = GraphFile::parse(fixture).unwrap().into_graph().unwrap();
    graph
}

fn root(graph: &CatalogueGraph) -> NodeIndex {
    graph.lookup("FC").unwrap()
}

fn only<'a>(node: &'a ProjectedNode, kind: LinkKind) -> &'a ProjectedNode {
    let targets: Vec<_> = node.field(kind).collect();
    assert_eq!(targets.len(), 1, "expected one {:?} link", kind);
    targets[0]
}

fn is_stub_of(node: &ProjectedNode, id: &str) -> bool {
    node.is_stub() && node.identifier.as_deref() == Some(id) && node.body.is_none()
}

/// (kind, target identifier) of every outgoing link, per identified node
fn link_sets(graph: &CatalogueGraph) -> Vec<(String, BTreeSet<(LinkKind, String)>)> {
    let mut sets: Vec<_> = graph
        .nodes()
        .filter_map(|(index, node)| {
            let id = node.identifier()?.to_string();
            let links = graph
                .links_out(index)
                .into_iter()
                .map(|(link, target)| (link.kind, graph.label(target)))
                .collect();
            Some((id, links))
        })
        .collect();
    sets.sort();
    sets
}

// =============================================================================
// Catalogue + inheritance scenario
// =============================================================================

#[test]
fn test_inheritance_scenario() {
    let graph = load(include_str!("fixtures/inheritance_catalogue.json"));
    let tree = project(&graph, root(&graph)).unwrap();

    // C in full, members A (full) then B (stub: expanded under R first)
    assert!(!tree.is_stub());
    let members: Vec<_> = tree.field(LinkKind::FeatureTypes).collect();
    assert_eq!(members.len(), 2);
    let a = members[0];
    assert_eq!(a.identifier.as_deref(), Some("A"));
    assert!(!a.is_stub());
    assert!(is_stub_of(members[1], "B"));

    // A points back to C with a stub
    assert!(is_stub_of(only(a, LinkKind::Catalogue), "FC"));

    // R in full: subtype A stubbed, supertype B expanded
    let r = only(a, LinkKind::InheritsFrom);
    assert_eq!(r.identifier.as_deref(), Some("R"));
    assert!(!r.is_stub());
    assert!(is_stub_of(only(r, LinkKind::Subtype), "A"));

    let b = only(r, LinkKind::Supertype);
    assert!(!b.is_stub());
    assert!(is_stub_of(only(b, LinkKind::Catalogue), "FC"));
    assert!(is_stub_of(only(b, LinkKind::InheritsTo), "R"));

    for id in ["FC", "A", "B", "R"] {
        assert_eq!(tree.occurrences(id).0, 1, "{} must appear in full once", id);
    }
}

#[test]
fn test_supertype_already_visited_is_stubbed() {
    // Same shape, but B is listed first so it is visited before R
    let mut builder = CatalogueBuilder::new();
    let c = builder.catalogue("FC", CatalogueBody::new("Transport")).unwrap();
    let b = builder.feature_type("B", FeatureTypeBody::new("Way")).unwrap();
    let a = builder.feature_type("A", FeatureTypeBody::new("Road")).unwrap();
    builder
        .inheritance("R", InheritanceBody::default(), a, b)
        .unwrap();
    let graph = builder.build();

    let tree = project(&graph, c).unwrap();
    let members: Vec<_> = tree.field(LinkKind::FeatureTypes).collect();
    let b_full = members[0];
    assert!(!b_full.is_stub());
    assert!(is_stub_of(members[1], "A"));

    // R is reached from B this time; its supertype is B again
    let r = only(b_full, LinkKind::InheritsTo);
    assert!(is_stub_of(only(r, LinkKind::Supertype), "B"));
    let a_full = only(r, LinkKind::Subtype);
    assert!(!a_full.is_stub());
    assert!(is_stub_of(only(a_full, LinkKind::InheritsFrom), "R"));
}

// =============================================================================
// Association roles
// =============================================================================

#[test]
fn test_role_relation_is_stub() {
    let graph = load(include_str!("fixtures/association_roles.json"));
    let tree = project(&graph, root(&graph)).unwrap();

    let association = tree
        .field(LinkKind::FeatureTypes)
        .find(|n| n.kind == NodeKind::FeatureAssociation)
        .unwrap();
    assert!(!association.is_stub());

    let roles: Vec<_> = association.field(LinkKind::Roles).collect();
    assert_eq!(roles.len(), 2);
    for role in &roles {
        assert!(!role.is_stub());
        assert!(is_stub_of(only(role, LinkKind::FeatureType), "S"));
        assert!(is_stub_of(only(role, LinkKind::Relation), "S"));
    }
    assert!(is_stub_of(only(roles[0], LinkKind::ValueType), "X"));
    assert!(is_stub_of(only(roles[1], LinkKind::ValueType), "Y"));

    match roles[1].body.as_ref() {
        Some(NodeBody::AssociationRole(role)) => {
            assert_eq!(role.role_type, RoleType::Aggregation);
            assert!(role.is_ordered);
        }
        other => panic!("Expected AssociationRole body, got {:?}", other),
    }

    // Full under the catalogue; each role stubs it as owner and as relation
    assert_eq!(tree.occurrences("S"), (1, 4));
}

// =============================================================================
// Anonymous nodes
// =============================================================================

#[test]
fn test_anonymous_shared_node_emitted_in_full_every_time() {
    let graph = load(include_str!("fixtures/anonymous_shared.json"));
    let options = ProjectionOptions {
        missing_identifier: MissingIdentifierPolicy::Allow,
    };
    let tree = ProjectionContext::new(&graph, options)
        .project(root(&graph))
        .unwrap();

    let widths: Vec<_> = tree
        .iter()
        .filter(|n| n.kind == NodeKind::FeatureAttribute && n.identifier.is_none())
        .collect();
    assert_eq!(widths.len(), 2);
    assert!(widths.iter().all(|n| !n.is_stub() && n.body.is_some()));

    // The identified shared attribute collapses as usual
    assert_eq!(tree.occurrences("name"), (1, 1));
}

#[test]
fn test_anonymous_shared_node_denied() {
    let graph = load(include_str!("fixtures/anonymous_shared.json"));
    let options = ProjectionOptions {
        missing_identifier: MissingIdentifierPolicy::Deny,
    };
    let err = ProjectionContext::new(&graph, options)
        .project(root(&graph))
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogueError::MissingIdentifier {
            kind: NodeKind::FeatureAttribute,
            reason: MissingIdentifierReason::Shared,
            ..
        }
    ));
}

// =============================================================================
// Documents
// =============================================================================

#[test]
fn test_projection_is_deterministic() {
    let fixture = include_str!("fixtures/association_roles.json");
    let first = load(fixture);
    let second = load(fixture);

    let doc1 = Document::new(project(&first, root(&first)).unwrap()).unwrap();
    let doc2 = Document::new(project(&second, root(&second)).unwrap()).unwrap();
    assert_eq!(doc1.checksum, doc2.checksum);
    assert_eq!(doc1.root, doc2.root);
}

#[test]
fn test_document_stub_json_shape() {
    let graph = load(include_str!("fixtures/inheritance_catalogue.json"));
    let doc = Document::new(project(&graph, root(&graph)).unwrap()).unwrap();
    let json = doc.to_json(&ExportConfig::default()).unwrap();

    let root_json = &json["root"];
    assert_eq!(root_json["kind"], "FeatureCatalogue");
    assert_eq!(root_json["versionNumber"], "1.0");
    assert_eq!(
        root_json["featureType"][1],
        serde_json::json!({"kind": "FeatureType", "id": "B", "isReference": true})
    );
    assert_eq!(root_json["featureType"][0]["inheritsFrom"][0]["uniqueInstance"], true);
    assert_eq!(json["stats"]["full"], 4);
    assert_eq!(json["stats"]["stubs"], 5);
    assert_eq!(json["checksum"], doc.checksum.as_str());
}

#[test]
fn test_resolve_round_trip() {
    for fixture in [
        include_str!("fixtures/inheritance_catalogue.json"),
        include_str!("fixtures/association_roles.json"),
    ] {
        let graph = load(fixture);
        let doc = Document::new(project(&graph, root(&graph)).unwrap()).unwrap();
        let text = doc.to_string(&ExportConfig::default()).unwrap();

        let parsed = Document::parse(&text).unwrap();
        let resolved = resolve_document(&parsed.root).unwrap();

        assert_eq!(resolved.node_count(), graph.node_count());
        assert_eq!(resolved.link_count(), graph.link_count());
        assert_eq!(link_sets(&resolved), link_sets(&graph));

        // Projecting the resolved graph gives the same document
        let again = Document::new(project(&resolved, root(&resolved)).unwrap()).unwrap();
        assert_eq!(again.checksum, doc.checksum);
    }
}

#[test]
fn test_deep_inheritance_chain_round_trip() {
    // T0 <- T1 <- ... <- T45: each step nests R and T inside the previous type
    let mut builder = CatalogueBuilder::new();
    let c = builder.catalogue("FC", CatalogueBody::new("Lineage")).unwrap();
    let mut types = Vec::new();
    for i in 0..=45 {
        let name = format!("Type{}", i);
        types.push(builder.feature_type(format!("T{}", i), FeatureTypeBody::new(name)).unwrap());
    }
    for (i, pair) in types.windows(2).enumerate() {
        builder
            .inheritance(format!("R{}", i), InheritanceBody::default(), pair[1], pair[0])
            .unwrap();
    }
    let graph = builder.build();

    let doc = Document::new(project(&graph, c).unwrap()).unwrap();
    for format in [feature_catalogue::OutputFormat::Pretty, feature_catalogue::OutputFormat::Compact] {
        let export = ExportConfig {
            output_format: format,
            ..ExportConfig::default()
        };
        let text = doc.to_string(&export).unwrap();
        let parsed = Document::parse(&text).unwrap();
        assert_eq!(parsed.checksum, doc.checksum);

        let resolved = resolve_document(&parsed.root).unwrap();
        assert_eq!(resolved.node_count(), graph.node_count());
        assert_eq!(link_sets(&resolved), link_sets(&graph));
    }
}

#[test]
fn test_graph_file_round_trip_through_disk() {
    let graph = load(include_str!("fixtures/association_roles.json"));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roles.json");
    GraphFile::from_graph(&graph)
        .write(&path, feature_catalogue::OutputFormat::Pretty)
        .unwrap();

    let (reloaded, keys) = GraphFile::read(&path).unwrap().into_graph().unwrap();
    assert_eq!(keys.len(), graph.node_count());
    assert_eq!(link_sets(&reloaded), link_sets(&graph));
}
