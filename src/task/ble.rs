//! # BLE task
//! The remote command link: a connectable GATT peripheral on the CYW43 radio.
//!
//! One custom service with two write characteristics:
//! - command (`...0003`): every write is one command frame
//! - time (`...0002`): `[hour, minute]`, turned into a `SetClock` frame
//!
//! Written frames are decoded right here and queued for the poll loop, the BLE task
//! never touches the alarm state itself. Only one phone can be connected at a time,
//! advertising restarts after every disconnect.
use defmt::{Debug2Format, info, warn};
use embassy_futures::join::join;
use embassy_time::Timer;
use pico_haptic_alarm::command::{self, Frame, OP_SET_CLOCK};
use pico_haptic_alarm::event::{self, Inbound};
use trouble_host::prelude::*;

/// Max number of connections
const CONNECTIONS_MAX: usize = 1;

/// Max number of L2CAP channels (signalling + ATT)
const L2CAP_CHANNELS_MAX: usize = 2;

/// HCI controller on top of the CYW43 bluetooth transport
pub type BleController = ExternalController<cyw43::bluetooth::BtDriver<'static>, 10>;

/// Random static address of the peripheral
const ADDRESS: [u8; 6] = [0x41, 0x4c, 0x41, 0x52, 0x4d, 0xff];

/// Alarm service UUID `550e8400-e29b-41d4-a716-446655440000`, little endian for advertising
const ALARM_SERVICE_UUID_LE: [u8; 16] = [
    0x00, 0x00, 0x44, 0x55, 0x66, 0x44, 0x16, 0xa7, 0xd4, 0x41, 0x9b, 0xe2, 0x00, 0x84, 0x0e, 0x55,
];

/// GATT server exposed to the phone app
#[gatt_server]
struct Server {
    /// The alarm remote
    remote: RemoteService,
}

/// Alarm remote service
#[gatt_service(uuid = "550e8400-e29b-41d4-a716-446655440000")]
struct RemoteService {
    /// Wall clock as `[hour, minute]`
    #[characteristic(uuid = "550e8400-e29b-41d4-a716-446655440002", write)]
    time: [u8; 2],
    /// One command frame per write
    #[characteristic(uuid = "550e8400-e29b-41d4-a716-446655440003", write)]
    command: Frame,
}

/// Run the BLE host and serve phones until the stack fails
#[embassy_executor::task]
pub async fn ble_task(controller: BleController, device_name: &'static str) {
    let mut resources: HostResources<DefaultPacketPool, CONNECTIONS_MAX, L2CAP_CHANNELS_MAX> = HostResources::new();
    let stack = trouble_host::new(controller, &mut resources).set_random_address(Address::random(ADDRESS));
    let Host {
        mut peripheral,
        mut runner,
        ..
    } = stack.build();

    let server = match Server::new_with_config(GapConfig::Peripheral(PeripheralConfig {
        name: device_name,
        appearance: &appearance::UNKNOWN,
    })) {
        Ok(server) => server,
        Err(e) => {
            warn!("[ble] could not build GATT server: {}", e);
            return;
        }
    };

    info!("[ble] starting as {}", device_name);
    let _ = join(
        async {
            loop {
                if let Err(e) = runner.run().await {
                    warn!("[ble] host runner stopped: {:?}", Debug2Format(&e));
                    Timer::after_secs(1).await;
                }
            }
        },
        async {
            loop {
                if let Err(e) = serve_one(&mut peripheral, &server, device_name).await {
                    warn!("[ble] connection ended with error: {:?}", Debug2Format(&e));
                    Timer::after_secs(1).await;
                }
            }
        },
    )
    .await;
}

/// Advertise, accept one connection and handle its writes until it disconnects
async fn serve_one<'values, 'server>(
    peripheral: &mut Peripheral<'values, BleController, DefaultPacketPool>,
    server: &'server Server<'values>,
    device_name: &str,
) -> Result<(), BleHostError<<BleController as Controller>::Error>> {
    let mut adv_data = [0; 31];
    let adv_len = AdStructure::encode_slice(
        &[
            AdStructure::Flags(LE_GENERAL_DISCOVERABLE | BR_EDR_NOT_SUPPORTED),
            AdStructure::ServiceUuids128(&[ALARM_SERVICE_UUID_LE]),
        ],
        &mut adv_data[..],
    )?;
    let mut scan_data = [0; 31];
    let scan_len = AdStructure::encode_slice(
        &[AdStructure::CompleteLocalName(device_name.as_bytes())],
        &mut scan_data[..],
    )?;

    info!("[ble] advertising");
    let advertiser = peripheral
        .advertise(
            &AdvertisementParameters::default(),
            Advertisement::ConnectableScannableUndirected {
                adv_data: &adv_data[..adv_len],
                scan_data: &scan_data[..scan_len],
            },
        )
        .await?;
    let conn = advertiser.accept().await?.with_attribute_server(server)?;
    info!("[ble] connected");

    loop {
        match conn.next().await {
            GattConnectionEvent::Disconnected { reason } => {
                info!("[ble] disconnected: {:?}", Debug2Format(&reason));
                return Ok(());
            }
            GattConnectionEvent::Gatt { event } => {
                if let GattEvent::Write(write) = &event {
                    on_write(server, write.handle(), write.data());
                }
                match event.accept() {
                    Ok(reply) => reply.send().await,
                    Err(e) => warn!("[ble] error sending response: {:?}", e),
                }
            }
            _ => {}
        }
    }
}

/// Decode a characteristic write and queue it for the poll loop
fn on_write(server: &Server<'_>, handle: u16, data: &[u8]) {
    let inbound: Inbound = if handle == server.remote.command.handle {
        event::decode_frame(data)
    } else if handle == server.remote.time.handle {
        command::frame_with_opcode(OP_SET_CLOCK, data).and_then(|frame| command::decode(&frame))
    } else {
        return;
    };

    info!("[ble] frame {:?} -> {:?}", data, inbound);
    // a full queue is logged by the channel side
    let _ = event::submit(inbound);
}
