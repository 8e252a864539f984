//! Back-office configuration, grouped by domain.
//!
//! Each domain is a singleton bag of settings stored as JSON values so the
//! API can read and patch them without per-setting endpoints.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::RwLock;

use posforge_core::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigDomain {
    Inventory,
    Sales,
    Purchases,
    Reports,
    Notifications,
    System,
}

impl ConfigDomain {
    pub const ALL: [ConfigDomain; 6] = [
        ConfigDomain::Inventory,
        ConfigDomain::Sales,
        ConfigDomain::Purchases,
        ConfigDomain::Reports,
        ConfigDomain::Notifications,
        ConfigDomain::System,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigDomain::Inventory => "inventory",
            ConfigDomain::Sales => "sales",
            ConfigDomain::Purchases => "purchases",
            ConfigDomain::Reports => "reports",
            ConfigDomain::Notifications => "notifications",
            ConfigDomain::System => "system",
        }
    }

    fn defaults(self) -> BTreeMap<String, Value> {
        let map = match self {
            ConfigDomain::Inventory => json!({
                "stock_minimo_alerta": 10,
                "dias_alerta_vencimiento": 30,
                "permitir_stock_negativo": false,
                "actualizar_precios_automatico": false,
                "margen_ganancia_default": 30.0,
            }),
            ConfigDomain::Sales => json!({
                "descuento_maximo": 20.0,
                "permitir_ventas_credito": true,
                "limite_credito_default": 10_000.0,
                "dias_credito_default": 30,
                "permitir_precios_personalizados": false,
            }),
            ConfigDomain::Purchases => json!({
                "aprobacion_requerida_monto": 50_000.0,
                "proveedor_requerido": true,
                "dias_alerta_pago": 7,
                "permitir_compra_producto_inactivo": false,
            }),
            ConfigDomain::Reports => json!({
                "periodo_reporte_default": "mensual",
                "incluir_graficos": true,
                "top_productos_count": 10,
                "enviar_reporte_email": false,
                "email_destinatarios": "",
            }),
            ConfigDomain::Notifications => json!({
                "notificar_stock_bajo": true,
                "notificar_productos_vencidos": true,
                "notificar_pagos_pendientes": true,
                "notificar_creditos_vencidos": true,
                "notificar_nueva_venta": false,
                "notificar_cierre_caja": true,
            }),
            ConfigDomain::System => json!({
                "nombre_empresa": "Pchela Belén",
                "rut_empresa": "",
                "direccion": "",
                "telefono": "",
                "email_contacto": "",
                "moneda": "ARS",
                "zona_horaria": "America/Argentina/Buenos_Aires",
                "formato_fecha": "DD/MM/YYYY",
                "idioma": "es",
            }),
        };
        match map {
            Value::Object(obj) => obj.into_iter().collect(),
            _ => BTreeMap::new(),
        }
    }
}

impl core::fmt::Display for ConfigDomain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigDomain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigDomain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| DomainError::invalid_id(format!("unknown config domain: {s}")))
    }
}

/// In-memory configuration store, seeded with the stock defaults.
#[derive(Debug)]
pub struct ConfigStore {
    inner: RwLock<BTreeMap<ConfigDomain, BTreeMap<String, Value>>>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        let inner = ConfigDomain::ALL
            .into_iter()
            .map(|d| (d, d.defaults()))
            .collect();
        Self {
            inner: RwLock::new(inner),
        }
    }

    fn poisoned() -> DomainError {
        DomainError::conflict("config store lock poisoned")
    }

    /// Current settings of one domain.
    pub fn get(&self, domain: ConfigDomain) -> Result<BTreeMap<String, Value>, DomainError> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner.get(&domain).cloned().unwrap_or_default())
    }

    /// Merge a partial update into a domain. Only known keys are accepted.
    pub fn update(
        &self,
        domain: ConfigDomain,
        changes: BTreeMap<String, Value>,
    ) -> Result<BTreeMap<String, Value>, DomainError> {
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;
        let settings = inner.entry(domain).or_insert_with(|| domain.defaults());

        for (key, value) in changes {
            if !settings.contains_key(&key) {
                return Err(DomainError::validation(format!(
                    "unknown setting '{key}' for domain {domain}"
                )));
            }
            settings.insert(key, value);
        }

        Ok(settings.clone())
    }
}
