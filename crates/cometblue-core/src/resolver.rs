//! Address-to-peripheral resolution.
//!
//! Drivers do not search for their radio connection themselves. The host
//! hands each driver a [`DeviceResolver`] at construction: a function value
//! that maps a Bluetooth address to a connectable `btleplug` peripheral, or
//! `None` when nothing matching is known.

use std::future::Future;
use std::sync::Arc;

use btleplug::api::{Central, Manager as _, Peripheral as _};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::debug;

use crate::error::{Error, Result};
use crate::util::{addresses_match, format_peripheral_id};

/// Resolves a device address to a connectable peripheral.
pub type DeviceResolver =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<Option<Peripheral>>> + Send + Sync>;

/// Wrap an async closure as a [`DeviceResolver`].
///
/// ```
/// use cometblue_core::resolver;
///
/// let resolve = resolver::from_fn(|_address| async { Ok(None) });
/// # let _ = resolve;
/// ```
pub fn from_fn<F, Fut>(f: F) -> DeviceResolver
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Peripheral>>> + Send + 'static,
{
    Arc::new(move |address| f(address).boxed())
}

/// A resolver that never finds anything.
pub fn unresolvable() -> DeviceResolver {
    from_fn(|_address| async { Ok(None) })
}

/// Resolve against the peripherals already known to `adapter`.
///
/// Only devices the adapter has seen advertising are found; scanning is the
/// caller's business.
pub fn adapter_resolver(adapter: Adapter) -> DeviceResolver {
    from_fn(move |address| {
        let adapter = adapter.clone();
        async move { find_peripheral_by_address(&adapter, &address).await }
    })
}

/// Resolve against the first Bluetooth adapter, looked up on every call.
pub fn default_resolver() -> DeviceResolver {
    from_fn(|address| async move {
        let adapter = get_adapter().await?;
        find_peripheral_by_address(&adapter, &address).await
    })
}

/// Get the first available Bluetooth adapter.
pub async fn get_adapter() -> Result<Adapter> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;

    adapters
        .into_iter()
        .next()
        .ok_or_else(|| Error::device_not_found("no Bluetooth adapter available"))
}

/// Find a known peripheral by Bluetooth address.
///
/// macOS hides real addresses, so the platform peripheral ID is compared as
/// well.
pub async fn find_peripheral_by_address(
    adapter: &Adapter,
    address: &str,
) -> Result<Option<Peripheral>> {
    for peripheral in adapter.peripherals().await? {
        let peripheral_id = format_peripheral_id(&peripheral.id());
        if peripheral_id.eq_ignore_ascii_case(address) {
            debug!("Resolved {} by peripheral ID", address);
            return Ok(Some(peripheral));
        }

        if let Ok(Some(props)) = peripheral.properties().await
            && addresses_match(&props.address.to_string(), address)
        {
            debug!("Resolved {} by address", address);
            return Ok(Some(peripheral));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unresolvable_returns_none() {
        let resolve = unresolvable();
        let found = resolve("11:22:33:44:55:66".to_string()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_from_fn_passes_address_through() {
        let resolve = from_fn(|address| async move {
            Err(Error::device_not_found(address))
        });
        let err = resolve("AA:BB".to_string()).await.unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound(ref a) if a == "AA:BB"));
    }
}
