use async_trait::async_trait;
use hybridrag_models::{Chunk, Entity, GraphFact, Relationship};
use neo4rs::{query, BoltNull, BoltType, ConfigBuilder, Graph, Query};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{GraphError, GraphResult};
use crate::graph_db::{cypher, GraphIngestSummary, GraphStats, GraphStore};

/// Neo4j-backed graph store, compatible with both local Neo4j and AuraDB
pub struct Neo4jGraphStore {
    graph: Arc<Graph>,
    uri: String,
}

impl Neo4jGraphStore {
    /// Connect and verify the connection with a trivial query
    ///
    /// # Arguments
    /// * `uri` - `bolt://localhost:7687`, or `neo4j+s://xxxxx.databases.neo4j.io` for AuraDB
    pub async fn connect(uri: &str, user: &str, password: &str, database: &str) -> GraphResult<Self> {
        tracing::info!("🔷 Connecting to Neo4j at: {}", uri);

        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .db(database)
            .fetch_size(500)
            .max_connections(10)
            .build()
            .map_err(|e| GraphError::Neo4j(format!("Failed to build Neo4j config: {}", e)))?;

        let graph = Graph::connect(config)
            .await
            .map_err(|e| GraphError::Neo4j(format!("Failed to connect to Neo4j: {}", e)))?;

        let mut result = graph
            .execute(query("RETURN 1 as test"))
            .await
            .map_err(|e| GraphError::Neo4j(format!("Connection test failed: {}", e)))?;

        if result.next().await?.is_some() {
            tracing::info!("✅ Neo4j connection established successfully");
        }

        Ok(Self {
            graph: Arc::new(graph),
            uri: uri.to_string(),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Id lookups back every MERGE/MATCH in ingestion
    pub async fn ensure_indexes(&self) -> GraphResult<()> {
        for statement in cypher::INDEXES {
            self.graph.run(query(statement)).await?;
        }
        Ok(())
    }

    async fn count(&self, statement: &str) -> GraphResult<i64> {
        let mut result = self.graph.execute(query(statement)).await?;
        match result.next().await? {
            Some(row) => Ok(row.get::<i64>("count")?),
            None => Ok(0),
        }
    }

    fn chunk_query(chunk: &Chunk) -> Query {
        query(cypher::MERGE_CHUNK)
            .param("id", chunk.id.to_string())
            .param("text", chunk.text.clone())
            .param("source_file", optional_string(chunk.provenance()))
            .param("chunk_index", chunk.chunk_index as i64)
    }

    fn relationship_query(relationship: &Relationship) -> Query {
        query(&cypher::create_relationship(&relationship.relationship_type))
            .param("source_id", relationship.source.to_string())
            .param("target_id", relationship.target.to_string())
            .param("type", relationship.relationship_type.clone())
            .param("source_file", optional_string(relationship.source_file.clone()))
    }
}

fn optional_string(value: Option<String>) -> BoltType {
    match value {
        Some(v) => BoltType::from(v),
        None => BoltType::Null(BoltNull),
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn ingest(
        &self,
        entities: &[Entity],
        chunks: &[Chunk],
        relationships: &[Relationship],
    ) -> GraphResult<GraphIngestSummary> {
        if let Err(e) = self.ensure_indexes().await {
            tracing::warn!(error = %e, "Could not create graph indexes, continuing without them");
        }

        let mut summary = GraphIngestSummary::default();

        for entity in entities {
            self.graph
                .run(
                    query(cypher::CREATE_ENTITY)
                        .param("id", entity.id.to_string())
                        .param("name", entity.name.clone()),
                )
                .await?;
            summary.entities += 1;
        }
        hybridrag_observability::log_db!("CREATE", "Entity", summary.entities);

        for chunk in chunks {
            self.graph.run(Self::chunk_query(chunk)).await?;
            summary.chunks += 1;

            for entity_id in &chunk.entity_ids {
                self.graph
                    .run(
                        query(cypher::MERGE_MENTION)
                            .param("chunk_id", chunk.id.to_string())
                            .param("entity_id", entity_id.to_string()),
                    )
                    .await?;
                summary.mentions += 1;
            }
        }
        hybridrag_observability::log_db!("MERGE", "Chunk", summary.chunks);

        for relationship in relationships {
            self.graph.run(Self::relationship_query(relationship)).await?;
            summary.relationships += 1;
        }
        hybridrag_observability::log_db!("CREATE", "Relationship", summary.relationships);

        tracing::info!(
            entities = summary.entities,
            chunks = summary.chunks,
            mentions = summary.mentions,
            relationships = summary.relationships,
            "Graph ingest complete"
        );

        Ok(summary)
    }

    async fn neighborhood(&self, chunk_ids: &[Uuid], limit: usize) -> GraphResult<Vec<GraphFact>> {
        if chunk_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = chunk_ids.iter().map(Uuid::to_string).collect();
        let mut result = self
            .graph
            .execute(
                query(cypher::NEIGHBORHOOD)
                    .param("chunk_ids", ids)
                    .param("limit", limit as i64),
            )
            .await?;

        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            let entity: String = row.get("entity")?;
            let rel: Option<String> = row.get("rel")?;
            let related: Option<String> = row.get("related_node")?;
            rows.push((entity, rel, related));
        }

        Ok(cypher::collect_facts(rows))
    }

    async fn stats(&self) -> GraphResult<GraphStats> {
        Ok(GraphStats {
            entity_nodes: self.count(cypher::COUNT_ENTITIES).await?,
            chunk_nodes: self.count(cypher::COUNT_CHUNKS).await?,
            total_relationships: self.count(cypher::COUNT_RELATIONSHIPS).await?,
            mentions_relationships: self.count(cypher::COUNT_MENTIONS).await?,
        })
    }

    async fn clear(&self) -> GraphResult<()> {
        self.graph.run(query(cypher::DELETE_ALL)).await?;
        tracing::warn!(uri = %self.uri, "Deleted all graph nodes and relationships");
        Ok(())
    }
}
