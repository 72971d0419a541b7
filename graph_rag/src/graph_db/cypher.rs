//! Cypher statements used by the Neo4j store.

use hybridrag_models::{sanitize_relationship_type, GraphFact};
use std::collections::HashSet;

pub const CREATE_ENTITY: &str = "CREATE (n:Entity {id: $id, name: $name})";

pub const MERGE_CHUNK: &str = "MERGE (c:Chunk {id: $id}) \
     SET c.text = $text, c.source_file = $source_file, c.chunk_index = $chunk_index";

pub const MERGE_MENTION: &str = "MATCH (c:Chunk {id: $chunk_id}), (e:Entity {id: $entity_id}) \
     MERGE (c)-[:MENTIONS]->(e)";

pub const NEIGHBORHOOD: &str = "MATCH (c:Chunk)-[:MENTIONS]->(e:Entity) \
     WHERE c.id IN $chunk_ids \
     OPTIONAL MATCH (e)-[r]-(related:Entity) \
     RETURN e.name AS entity, type(r) AS rel, related.name AS related_node \
     LIMIT $limit";

pub const COUNT_ENTITIES: &str = "MATCH (n:Entity) RETURN count(n) AS count";
pub const COUNT_CHUNKS: &str = "MATCH (n:Chunk) RETURN count(n) AS count";
pub const COUNT_RELATIONSHIPS: &str = "MATCH ()-[r]->() RETURN count(r) AS count";
pub const COUNT_MENTIONS: &str = "MATCH ()-[r:MENTIONS]->() RETURN count(r) AS count";

pub const DELETE_ALL: &str = "MATCH (n) DETACH DELETE n";

pub const INDEXES: [&str; 2] = [
    "CREATE INDEX entity_id IF NOT EXISTS FOR (e:Entity) ON (e.id)",
    "CREATE INDEX chunk_id IF NOT EXISTS FOR (c:Chunk) ON (c.id)",
];

/// Edge creation between two entities. Relationship types can't be
/// parameterized, so the sanitized label is inlined and backtick-quoted.
pub fn create_relationship(raw_type: &str) -> String {
    format!(
        "MATCH (a:Entity {{id: $source_id}}), (b:Entity {{id: $target_id}}) \
         CREATE (a)-[:`{}` {{original_type: $type, source_file: $source_file}}]->(b)",
        sanitize_relationship_type(raw_type)
    )
}

/// Turn neighborhood rows into facts, dropping rows without an edge and
/// repeated facts while keeping first-seen order.
pub fn collect_facts<I>(rows: I) -> Vec<GraphFact>
where
    I: IntoIterator<Item = (String, Option<String>, Option<String>)>,
{
    let mut seen = HashSet::new();
    let mut facts = Vec::new();

    for (entity, rel, related) in rows {
        let (Some(relationship), Some(related)) = (rel, related) else {
            continue;
        };
        if relationship.is_empty() || related.is_empty() {
            continue;
        }

        let fact = GraphFact {
            entity,
            relationship,
            related,
        };
        if seen.insert(fact.clone()) {
            facts.push(fact);
        }
    }

    facts
}
