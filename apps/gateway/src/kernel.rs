// [apps/gateway/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY KERNEL (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: IGNICIÓN DE `AppState` Y CICLO DE VIDA DEL PROCESO
 *
 * VISION HIPER-HOLÍSTICA:
 * A diferencia del kernel original, este no posee un transporte HTTP
 * propio: el Gate Pipeline se expone como una funcion de libreria
 * (`message::process`) que un binding externo (HTTP, WebSocket, cola de
 * mensajes) invoca directamente. Lo unico que este kernel posee es el
 * ciclo de vida del proceso: ignicion, senal de apagado, drenado.
 * =================================================================
 */

use tracing::{error, info, instrument};

use crate::bootstrap::bootstrap;
use crate::state::AppState;

pub struct GatewayKernel {
    pub application_state: AppState,
}

impl GatewayKernel {
    /// Ensambla todo aparato core/dominio/infra en un `AppState` listo
    /// para recibir submissions.
    #[instrument]
    pub async fn ignite() -> anyhow::Result<Self> {
        let application_state = bootstrap().await?;
        info!("🚀 [GATEWAY_ONLINE]: Gate Pipeline wired and operational.");
        Ok(Self { application_state })
    }

    /// Mantiene el proceso vivo hasta recibir una senal de apagado. Un
    /// binding externo sostiene su propio loop de I/O en paralelo,
    /// llamando a `message::process(&kernel.application_state, ..)` por
    /// cada submission; este metodo solo gobierna cuando el proceso mismo
    /// debe terminar.
    pub async fn run_until_shutdown(self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("🛑 [SHUTDOWN_SIGNAL]: Ctrl-C received, draining in place."),
            Err(signal_error) => error!("💀 [SIGNAL_HANDLER_FAULT]: Failed to listen for shutdown signal: {}", signal_error),
        }
    }
}
