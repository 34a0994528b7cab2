/*****************************************************************************
 *   Ledger App Boilerplate Rust.
 *   (c) 2023 Ledger SAS.
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 *****************************************************************************/

#![cfg_attr(
    any(
        target_os = "nanox",
        target_os = "nanosplus",
        target_os = "stax",
        target_os = "flex"
    ),
    no_std,
    no_main
)]

#[cfg(any(
    target_os = "nanox",
    target_os = "nanosplus",
    target_os = "stax",
    target_os = "flex"
))]
mod device;

#[cfg(any(
    target_os = "nanox",
    target_os = "nanosplus",
    target_os = "stax",
    target_os = "flex"
))]
ledger_device_sdk::set_panic!(ledger_device_sdk::exiting_panic);

// Required for using String, Vec, format!...
extern crate alloc;

#[cfg(any(
    target_os = "nanox",
    target_os = "nanosplus",
    target_os = "stax",
    target_os = "flex"
))]
#[no_mangle]
extern "C" fn sample_main() {
    device::run();
}

/// The application only runs on a device; host builds exist for the library tests.
#[cfg(not(any(
    target_os = "nanox",
    target_os = "nanosplus",
    target_os = "stax",
    target_os = "flex"
)))]
fn main() {}
