// [libs/core/token-forge/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ACKNOWLEDGMENT TOKEN FORGE (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: EMISION Y VALIDACION DE RECONOCIMIENTOS DE UN SOLO USO
 *
 * Implementa el protocolo de la spec S4.3: un soft-veto de Shield emite un
 * AckToken; el usuario debe reenviar el mensaje original junto al texto
 * requerido y el token para que Shield haga bypass de su clasificacion.
 * =================================================================
 */

pub mod nonce_store;
pub mod token;

pub use nonce_store::NonceStore;
pub use token::{AckToken, AckValidationError, IssueAckTokenInput, TokenForge, ValidateAckInput};
