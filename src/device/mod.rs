//! Device side: APDU transport, NBGL screens, seed-derived keys and flash storage.

mod keys;
#[cfg(feature = "debug")]
mod logger;
mod nvm;
mod ui;

use alloc::vec::Vec;

use ledger_device_sdk::io::{ApduHeader, Comm, Reply};
use ledger_device_sdk::nbgl::init_comm;

use ledger_tezos::config::AppConfig;
use ledger_tezos::{App, AppSW, Outcome, Response};

use keys::DeviceKeys;
use nvm::NvmStorage;
use ui::{ui_menu_main, ui_review, ui_status};

/// Header of the command being served. Every class is let through so that the library
/// answers a wrong one itself.
struct RawCommand;

impl TryFrom<ApduHeader> for RawCommand {
    type Error = Reply;

    fn try_from(_: ApduHeader) -> Result<Self, Self::Error> {
        Ok(RawCommand)
    }
}

impl RawCommand {
    /// The frame exactly as received, length byte included.
    fn frame(&self, comm: &Comm) -> Result<Vec<u8>, Reply> {
        comm.apdu_buffer
            .get(..comm.rx)
            .map(|raw| raw.to_vec())
            .ok_or_else(|| Reply(AppSW::WrongLength.status_word()))
    }
}

fn send(comm: &mut Comm, response: &Response) {
    comm.append(&response.data);
    comm.reply(Reply(response.status_word()));
}

pub fn run() {
    let mut comm = Comm::new();
    init_comm(&mut comm);

    #[cfg(feature = "debug")]
    logger::init();

    let mut app = App::new(AppConfig::from_build(), DeviceKeys, NvmStorage);
    log::info!("started in {:?} mode", app.config().mode);

    let mut home = ui_menu_main();
    home.show_and_return();

    loop {
        let command: RawCommand = comm.next_command();
        let raw = match command.frame(&comm) {
            Ok(raw) => raw,
            Err(reply) => {
                comm.reply(reply);
                continue;
            }
        };

        let response = match app.handle_frame(&raw) {
            Outcome::Reply(response) => response,
            Outcome::Confirm(prompt) => {
                let approved = ui_review(&prompt);
                let response = app
                    .resume(approved)
                    .unwrap_or_else(|| Response::error(AppSW::Rejected));
                ui_status(prompt.kind, response.status == AppSW::Ok);
                home.show_and_return();
                response
            }
        };
        send(&mut comm, &response);
    }
}
