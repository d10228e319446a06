// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// Cada variante vira uma mensagem distinta e acionável para o usuário;
// nada de "algo deu errado" genérico para violações de invariantes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Registro não encontrado em '{0}'")]
    NotFound(&'static str),

    #[error("A consulta em '{collection}' esperava exatamente 1 linha, mas encontrou {matched}")]
    NotSingular {
        collection: &'static str,
        matched: usize,
    },

    // Uma escrita sem o carimbo da loja é bug do chamador; falha na hora.
    #[error("Escrita em '{0}' sem o contexto da loja")]
    MissingTenant(&'static str),

    #[error("A categoria '{0}' ainda possui {1} produto(s) vinculado(s)")]
    CategoryNotEmpty(String, u32),

    #[error("Estoque insuficiente de '{product}': apenas {available} unidade(s) disponível(is)")]
    InsufficientStock { product: String, available: Decimal },

    #[error("Você precisa da permissão '{0}' para realizar esta ação")]
    PermissionDenied(&'static str),

    #[error("O SKU '{0}' já está em uso nesta loja")]
    SkuAlreadyExists(String),

    #[error("O valor recebido excede o saldo devedor da venda (restam {due})")]
    CollectionExceedsDue { due: Decimal },

    #[error("Código de convite inválido ou já utilizado")]
    InvalidInvite,

    #[error("Usuário não autenticado")]
    Unauthenticated,

    #[error("Cabeçalho X-Business-Id ausente ou inválido")]
    TenantHeaderInvalid,

    #[error("Você não tem acesso a esta loja")]
    TenantAccessDenied,

    #[error("Erro de E/S no snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de serialização do snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

/// Monta um `AppError::ValidationError` de um único campo, para as regras
/// de negócio que os serviços verificam manualmente (quantidade não
/// positiva, lista de itens vazia, etc).
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    let mut error = validator::ValidationError::new("invalid");
    error.message = Some(message.into());
    errors.add(field, error);
    AppError::ValidationError(errors)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),

            AppError::NotSingular { .. }
            | AppError::CategoryNotEmpty(_, _)
            | AppError::InsufficientStock { .. }
            | AppError::SkuAlreadyExists(_)
            | AppError::CollectionExceedsDue { .. } => (StatusCode::CONFLICT, self.to_string()),

            AppError::MissingTenant(_)
            | AppError::TenantHeaderInvalid
            | AppError::InvalidInvite => (StatusCode::BAD_REQUEST, self.to_string()),

            AppError::PermissionDenied(_) | AppError::TenantAccessDenied => {
                (StatusCode::FORBIDDEN, self.to_string())
            }

            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),

            // Todos os outros erros viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            AppError::Io(_) | AppError::Serialization(_) | AppError::InternalServerError(_) => {
                tracing::error!("Erro Interno do Servidor: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
