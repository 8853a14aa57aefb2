// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `devices` commands.

use serde_json::{Value, json};

use super::{Options, Report, find_device};
use crate::context::HubContext;
use crate::error::{Error, Result};
use crate::protocol::HubApi;
use crate::types::{ColorSpec, value_to_text};
use crate::write::WriteResult;

/// Lists devices with their zone names.
///
/// # Errors
///
/// Returns the hub's error if devices or zones cannot be fetched.
pub async fn list<H: HubApi>(ctx: &HubContext<H>) -> Result<Report> {
    let (devices, zones) = tokio::join!(ctx.api.devices(), ctx.api.zones());
    let (devices, zones) = (devices?, zones?);

    let devices: Vec<Value> = devices
        .into_values()
        .map(|device| {
            let zone = device
                .zone
                .as_ref()
                .map(|id| zones.get(id).map_or_else(|| id.clone(), |zone| zone.name.clone()));
            json!({
                "id": device.id,
                "name": device.name,
                "zone": zone,
                "class": device.class,
                "driver": device.driver_id,
                "available": device.available,
                "capabilities": device.capabilities,
            })
        })
        .collect();

    Ok(Report::table(
        json!({ "devices": devices }),
        &devices,
        &["id", "name", "zone", "class", "available"],
        "No devices found.",
    ))
}

/// Shows one device.
///
/// # Errors
///
/// Returns [`NotFoundError::Device`](crate::error::NotFoundError::Device)
/// for an unknown id, or the hub's error.
pub async fn get<H: HubApi>(ctx: &HubContext<H>, device_id: &str) -> Result<Report> {
    let device = find_device(&ctx.api, device_id).await?;

    let human = [
        format!("{} ({})", device.name, device.id),
        format!("Class: {}", device.class.as_deref().unwrap_or_default()),
        format!("Zone: {}", device.zone.as_deref().unwrap_or_default()),
        format!("Available: {}", device.available),
        format!("Capabilities: {}", device.capabilities.join(", ")),
    ]
    .join("\n");

    let data = json!({
        "id": device.id,
        "name": device.name,
        "zone": device.zone,
        "class": device.class,
        "driver": device.driver_id,
        "available": device.available,
        "capabilities": device.capabilities,
        "capabilitiesObj": device.capabilities_obj,
    });
    Ok(Report::new(data, human))
}

/// Lists the capability descriptors of one device.
///
/// # Errors
///
/// Returns a not-found error for an unknown device, or the hub's error.
pub async fn capabilities<H: HubApi>(ctx: &HubContext<H>, device_id: &str) -> Result<Report> {
    let device = find_device(&ctx.api, device_id).await?;

    let capabilities: Vec<Value> = device
        .capabilities_obj
        .iter()
        .map(|(id, info)| {
            json!({
                "id": id,
                "type": info.kind,
                "title": info.title,
                "unit": info.unit(),
                "min": info.min,
                "max": info.max,
                "setable": info.setable,
                "value": info.value,
            })
        })
        .collect();

    Ok(Report::table(
        json!({ "deviceId": device_id, "capabilities": capabilities }),
        &capabilities,
        &["id", "type", "setable", "value", "min", "max", "unit"],
        "No capabilities found.",
    ))
}

/// Reads the current value of one capability.
///
/// # Errors
///
/// Returns a not-found error for an unknown device or capability.
pub async fn read<H: HubApi>(
    ctx: &HubContext<H>,
    device_id: &str,
    capability_id: &str,
) -> Result<Report> {
    let device = find_device(&ctx.api, device_id).await?;
    let value = device.capability(capability_id)?.value.clone();

    let human = format!("{capability_id}: {}", value_to_text(&value));
    Ok(Report::new(
        json!({ "deviceId": device.id, "capabilityId": capability_id, "value": value }),
        human,
    ))
}

/// Splits `<capabilityId>=<value>` at the first `=`.
///
/// # Errors
///
/// Returns [`Error::Usage`] when there is no `=` or the capability id is empty.
///
/// # Examples
///
/// ```
/// use homey_cli::commands::devices::parse_assignment;
///
/// assert_eq!(parse_assignment("dim=0.5").unwrap(), ("dim", "0.5"));
/// assert_eq!(parse_assignment("label=a=b").unwrap(), ("label", "a=b"));
/// assert!(parse_assignment("dim").is_err());
/// assert!(parse_assignment("=1").is_err());
/// ```
pub fn parse_assignment(assignment: &str) -> Result<(&str, &str)> {
    let (capability_id, raw) = assignment.split_once('=').ok_or_else(|| {
        Error::Usage("Usage: homey-cli devices set <deviceId> <capabilityId>=<value>".to_string())
    })?;
    if capability_id.is_empty() {
        return Err(Error::Usage("Missing capability id.".to_string()));
    }
    Ok((capability_id, raw))
}

fn write_report(result: &WriteResult, human: String) -> Report {
    Report::new(json!(result), human)
}

/// Sets a capability from `<capabilityId>=<value>`.
///
/// # Errors
///
/// Returns a usage error for a malformed assignment, then any error of
/// [`CapabilityWriter::write`](crate::write::CapabilityWriter::write).
pub async fn set<H: HubApi>(
    ctx: &HubContext<H>,
    options: &Options,
    device_id: &str,
    assignment: &str,
) -> Result<Report> {
    let (capability_id, raw) = parse_assignment(assignment)?;
    let device = find_device(&ctx.api, device_id).await?;
    let result = options
        .writer
        .write(
            &ctx.api,
            &device,
            capability_id,
            &Value::from(raw),
            options.dry_run,
        )
        .await?;

    let assigned = format!("{capability_id}={}", value_to_text(&result.value));
    let human = if result.is_dry_run() {
        format!("Dry run: would set {assigned} on {}", result.device_id)
    } else {
        format!("Set {assigned} on {}", result.device_id)
    };
    Ok(write_report(&result, human))
}

/// Turns a device on or off through `onoff`.
///
/// # Errors
///
/// Returns any error of [`CapabilityWriter::write`](crate::write::CapabilityWriter::write).
pub async fn switch<H: HubApi>(
    ctx: &HubContext<H>,
    options: &Options,
    device_id: &str,
    on: bool,
) -> Result<Report> {
    let device = find_device(&ctx.api, device_id).await?;
    let result = options
        .writer
        .write(&ctx.api, &device, "onoff", &Value::Bool(on), options.dry_run)
        .await?;

    let verb = if on { "turn on" } else { "turn off" };
    let human = if result.is_dry_run() {
        format!("Dry run: would {verb} {}", result.device_id)
    } else if on {
        format!("Turned on {}", result.device_id)
    } else {
        format!("Turned off {}", result.device_id)
    };
    Ok(write_report(&result, human))
}

/// Sets `dim` to `level`.
///
/// # Errors
///
/// Returns any error of [`CapabilityWriter::write`](crate::write::CapabilityWriter::write).
pub async fn dim<H: HubApi>(
    ctx: &HubContext<H>,
    options: &Options,
    device_id: &str,
    level: &str,
) -> Result<Report> {
    let device = find_device(&ctx.api, device_id).await?;
    let result = options
        .writer
        .write(&ctx.api, &device, "dim", &Value::from(level), options.dry_run)
        .await?;

    let assigned = format!("dim={}", value_to_text(&result.value));
    let human = if result.is_dry_run() {
        format!("Dry run: would set {assigned} on {}", result.device_id)
    } else {
        format!("Set {assigned} on {}", result.device_id)
    };
    Ok(write_report(&result, human))
}

/// Sets a color from `#RRGGBB`, `hsv:h,s,v`, `h,s,v` or `temp:<value>`.
///
/// # Errors
///
/// Returns a validation error for unparseable input, then any error of
/// [`CapabilityWriter::write_color`](crate::write::CapabilityWriter::write_color).
pub async fn color<H: HubApi>(
    ctx: &HubContext<H>,
    options: &Options,
    device_id: &str,
    input: &str,
) -> Result<Report> {
    let spec = ColorSpec::parse(input)?;
    let device = find_device(&ctx.api, device_id).await?;
    let results = options
        .writer
        .write_color(&ctx.api, &device, spec, options.dry_run)
        .await?;

    let human = if options.dry_run {
        format!(
            "Dry run: would set {} color values on {}",
            results.len(),
            device.id
        )
    } else {
        format!("Updated color on {}", device.id)
    };
    Ok(Report::new(
        json!({ "deviceId": device.id, "results": results }),
        human,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{context, hub};
    use crate::error::{ErrorKind, NotFoundError};

    fn dry() -> Options {
        Options {
            dry_run: true,
            ..Options::default()
        }
    }

    #[tokio::test]
    async fn list_replaces_zone_id_with_name() {
        let report = list(&context(hub())).await.unwrap();
        assert_eq!(report.data["devices"][0]["zone"], "Office");
        assert!(report.human.contains("Desk lamp"));
        assert!(report.human.starts_with("id  "));
    }

    #[tokio::test]
    async fn empty_list_message() {
        let report = list(&context(crate::protocol::MemoryHub::new()))
            .await
            .unwrap();
        assert_eq!(report.human, "No devices found.");
        assert_eq!(report.data, json!({"devices": []}));
    }

    #[tokio::test]
    async fn get_renders_summary() {
        let report = get(&context(hub()), "lamp").await.unwrap();
        assert_eq!(
            report.human,
            "Desk lamp (lamp)\nClass: light\nZone: office\nAvailable: true\n\
             Capabilities: onoff, dim, light_hue, light_saturation, measure_power"
        );
        assert_eq!(report.data["driver"], "homey:app:com.example:bulb");
        assert_eq!(report.data["capabilitiesObj"]["dim"]["max"], 1.0);
    }

    #[tokio::test]
    async fn capabilities_table_and_payload() {
        let report = capabilities(&context(hub()), "lamp").await.unwrap();
        assert_eq!(report.data["deviceId"], "lamp");
        let ids: Vec<_> = report.data["capabilities"]
            .as_array()
            .unwrap()
            .iter()
            .map(|cap| cap["id"].as_str().unwrap().to_string())
            .collect();
        assert!(ids.contains(&"measure_power".to_string()));
        assert!(report.human.starts_with("id "));
    }

    #[tokio::test]
    async fn read_value() {
        let report = read(&context(hub()), "lamp", "measure_power").await.unwrap();
        assert_eq!(report.human, "measure_power: 12.5");
        assert_eq!(
            report.data,
            json!({"deviceId": "lamp", "capabilityId": "measure_power", "value": 12.5})
        );
    }

    #[tokio::test]
    async fn read_unknown_capability() {
        let err = read(&context(hub()), "lamp", "alarm_smoke")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound(NotFoundError::Capability { .. })
        ));
    }

    #[tokio::test]
    async fn set_applies_coerced_value() {
        let ctx = context(hub());
        let report = set(&ctx, &Options::default(), "lamp", "dim=0.3")
            .await
            .unwrap();
        assert_eq!(report.human, "Set dim=0.3 on lamp");
        assert_eq!(report.data["status"], "ok");
        assert_eq!(ctx.api.writes()[0].value, json!(0.3));
    }

    #[tokio::test]
    async fn set_dry_run_does_not_write() {
        let ctx = context(hub());
        let report = set(&ctx, &dry(), "lamp", "onoff=true").await.unwrap();
        assert_eq!(report.human, "Dry run: would set onoff=true on lamp");
        assert_eq!(report.data["dryRun"], true);
        assert!(ctx.api.writes().is_empty());
    }

    #[tokio::test]
    async fn set_without_equals_is_usage_error() {
        let err = set(&context(hub()), &dry(), "lamp", "dim")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[tokio::test]
    async fn set_read_only_capability_is_refused() {
        let ctx = context(hub());
        let err = set(&ctx, &Options::default(), "lamp", "measure_power=5")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Policy);
        assert!(ctx.api.writes().is_empty());
    }

    #[tokio::test]
    async fn on_off_messages() {
        let ctx = context(hub());
        let on = switch(&ctx, &Options::default(), "lamp", true)
            .await
            .unwrap();
        assert_eq!(on.human, "Turned on lamp");
        let off = switch(&ctx, &dry(), "lamp", false).await.unwrap();
        assert_eq!(off.human, "Dry run: would turn off lamp");
        assert_eq!(ctx.api.writes().len(), 1);
    }

    #[tokio::test]
    async fn dim_out_of_range_is_validation_error() {
        let err = dim(&context(hub()), &dry(), "lamp", "1.5")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn dim_message() {
        let report = dim(&context(hub()), &Options::default(), "lamp", "0.5")
            .await
            .unwrap();
        assert_eq!(report.human, "Set dim=0.5 on lamp");
    }

    #[tokio::test]
    async fn color_writes_hue_then_saturation() {
        let ctx = context(hub());
        let report = color(&ctx, &Options::default(), "lamp", "#ff0000")
            .await
            .unwrap();
        assert_eq!(report.human, "Updated color on lamp");
        let written: Vec<_> = ctx
            .api
            .writes()
            .into_iter()
            .map(|write| write.capability_id)
            .collect();
        assert_eq!(written, vec!["light_hue", "light_saturation"]);
        assert_eq!(report.data["results"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn color_dry_run_counts_values() {
        let ctx = context(hub());
        let report = color(&ctx, &dry(), "lamp", "hsv:180,50,100").await.unwrap();
        assert_eq!(report.human, "Dry run: would set 2 color values on lamp");
        assert!(ctx.api.writes().is_empty());
    }

    #[tokio::test]
    async fn temperature_needs_the_capability() {
        let err = color(&context(hub()), &dry(), "lamp", "temp:0.4")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound(NotFoundError::Capability { .. })
        ));
    }
}
