// src/db/query.rs

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

// ---
// A camada de consulta do Datastore
// ---
// Toda leitura passa por aqui: filtros de igualdade (conjuntivos, AND),
// uma única chave de ordenação asc/desc e um limite. As colunas usam os
// nomes serializados (camelCase), exatamente como saem no JSON.

/// Igualdade é o único operador exigido; os demais são ponto de extensão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl Filter {
    fn matches(&self, row: &Value) -> bool {
        // Campo ausente é tratado como null, não como erro.
        let field = row.get(&self.column).unwrap_or(&Value::Null);
        match self.operator {
            Operator::Eq => field == &self.value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiciona um filtro de igualdade sobre a coluna serializada.
    pub fn filter(mut self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            operator: Operator::Eq,
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Aplica filtros, ordenação e limite sobre as linhas já recortadas
    /// pelo escopo da loja. Cada linha é serializada uma única vez.
    pub(crate) fn apply<T: Serialize>(&self, rows: Vec<T>) -> Vec<T> {
        let mut pairs: Vec<(T, Value)> = rows
            .into_iter()
            .map(|row| {
                let value = serde_json::to_value(&row).unwrap_or(Value::Null);
                (row, value)
            })
            .collect();

        pairs.retain(|(_, value)| self.filters.iter().all(|f| f.matches(value)));

        if let Some(order) = &self.order {
            pairs.sort_by(|(_, a), (_, b)| {
                let left = a.get(&order.column).unwrap_or(&Value::Null);
                let right = b.get(&order.column).unwrap_or(&Value::Null);
                let ordering = value_cmp(left, right);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        let mut rows: Vec<T> = pairs.into_iter().map(|(row, _)| row).collect();
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

// Ordenação total sobre valores JSON: tipos iguais comparam entre si;
// tipos diferentes comparam pelo "rank" (null < bool < número < string).
fn value_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Linha {
        nome: String,
        valor: i64,
        ativo: bool,
    }

    fn linhas() -> Vec<Linha> {
        vec![
            Linha { nome: "b".into(), valor: 2, ativo: true },
            Linha { nome: "a".into(), valor: 3, ativo: false },
            Linha { nome: "c".into(), valor: 1, ativo: true },
        ]
    }

    #[test]
    fn filtros_sao_conjuntivos() {
        let query = Query::new().filter("ativo", true).filter("valor", 2);
        let out = query.apply(linhas());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].nome, "b");
    }

    #[test]
    fn campo_ausente_compara_com_null() {
        let query = Query::new().filter("inexistente", json!(null));
        assert_eq!(query.apply(linhas()).len(), 3);

        let query = Query::new().filter("inexistente", 1);
        assert!(query.apply(linhas()).is_empty());
    }

    #[test]
    fn ordenacao_asc_desc_e_limite() {
        let query = Query::new().order_by("valor", true);
        let out = query.apply(linhas());
        assert_eq!(out.iter().map(|l| l.valor).collect::<Vec<_>>(), vec![1, 2, 3]);

        let query = Query::new().order_by("nome", false).limit(2);
        let out = query.apply(linhas());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].nome, "c");
        assert_eq!(out[1].nome, "b");
    }
}
