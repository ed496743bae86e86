// [libs/domain/evidence/src/lib.rs]
/*!
 * =================================================================
 * APARATO: EVIDENCE BUILDER (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: SELECCIÓN DE CAPACIDADES Y ENSAMBLADO DEL EVIDENCE PACK
 *
 * VISION HIPER-HOLÍSTICA:
 * Este aparato nunca llama directamente a un proveedor concreto — ejecuta
 * lo que implementa `CapabilityProvider`, sin saber si es una llamada HTTP
 * real (SSRF Guard + Secure Transport) o un stub de prueba. El ensamblado
 * (formato, staleness, tokens numéricos, nivel de constraint, XML) es lo
 * único que posee en firme.
 * =================================================================
 */

pub mod builder;
pub mod capability;
pub mod freshness;
pub mod xml;

pub use builder::EvidenceBuilder;
pub use capability::{execute_capabilities, keyword_fallback_select, CapabilityDescriptor, CapabilityError, CapabilityProvider, SelectorInput, CAPABILITY_REGISTRY};
pub use freshness::FreshnessPolicy;
pub use xml::{build_envelope, escape_xml};
