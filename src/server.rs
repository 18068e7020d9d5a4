//! MCP server exposing the symbol index over stdio.

use crate::schema::inline_schema_for_type;
use crate::service::SearchService;
use crate::tools::{
    LookupSymbolRequest, SearchSymbolsRequest, handle_index_status, handle_lookup_symbol,
    handle_reload_index, handle_search_symbols,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server answering symbol queries from a shared [`SearchService`].
#[derive(Clone)]
pub struct SymbolServer {
    service: Arc<SearchService>,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SymbolServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolServer")
            .field("service", &self.service)
            .finish()
    }
}

#[tool_router]
impl SymbolServer {
    pub fn new(service: Arc<SearchService>) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    pub fn service(&self) -> &Arc<SearchService> {
        &self.service
    }

    #[tool(
        description = "Search documented symbols by name fragment. Case and punctuation are ignored, so 'halo::pack' matches 'packArray' in 'Cajita::Halo'. Overloads are listed together in documentation order.",
        input_schema = inline_schema_for_type::<SearchSymbolsRequest>()
    )]
    async fn search_symbols(
        &self,
        Parameters(request): Parameters<SearchSymbolsRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_symbols(&self.service, request).await
    }

    #[tool(
        description = "Show every record of one exact search token, e.g. 'permute'.",
        input_schema = inline_schema_for_type::<LookupSymbolRequest>()
    )]
    async fn lookup_symbol(
        &self,
        Parameters(request): Parameters<LookupSymbolRequest>,
    ) -> std::result::Result<String, String> {
        handle_lookup_symbol(&self.service, request).await
    }

    #[tool(description = "Report the size of the loaded symbol index and where it was read from.")]
    async fn index_status(&self) -> std::result::Result<String, String> {
        handle_index_status(&self.service).await
    }

    #[tool(description = "Rebuild the symbol index if its documentation sources changed on disk.")]
    async fn reload_index(&self) -> std::result::Result<String, String> {
        handle_reload_index(&self.service).await
    }
}

#[tool_handler]
impl ServerHandler for SymbolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "symsearch: incremental search over documented symbols. \
                 Use search_symbols with a partial name; results keep overloads together. \
                 Use lookup_symbol for one exact entry."
                    .to_string(),
            )
    }
}
