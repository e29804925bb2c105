//  Copyright (C) 2023 IBM Corp.
//
//  This library is free software; you can redistribute it and/or
//  modify it under the terms of the GNU Lesser General Public
//  License as published by the Free Software Foundation; either
//  version 2.1 of the License, or (at your option) any later version.
//
//  This library is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
//  Lesser General Public License for more details.
//
//  You should have received a copy of the GNU Lesser General Public
//  License along with this library; if not, write to the Free Software
//  Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301
//  USA

use prettytable::Table;

use crate::api::models::{PowerState, VmSummary};
use crate::error::Error;
use crate::listing::{Column, ListOptions, Listing};
use crate::vcenter::VmService;

pub fn listing() -> Listing<VmSummary> {
    Listing::new(
        vec![
            Column::new("ID", "id", |vm: &VmSummary| vm.vm.clone()),
            Column::new("Name", "name", |vm: &VmSummary| vm.name.clone()),
            Column::new("Power State", "power_state", |vm: &VmSummary| {
                vm.power_state.to_string()
            })
            .styled(power_state_style),
            Column::new("CPU Count", "cpu_count", |vm: &VmSummary| {
                vm.cpu_count.map(|c| c.to_string()).unwrap_or_default()
            })
            .numeric(),
            Column::new("RAM Size (MiB)", "memory_size_mib", |vm: &VmSummary| {
                vm.memory_size_mib.map(format_number).unwrap_or_default()
            })
            .numeric(),
        ],
        "name",
    )
}

/// Fetch every VM from `service` and build the table.
pub fn render(service: &dyn VmService, opts: &ListOptions) -> Result<Table, Error> {
    let vms = service.list_vms()?;
    listing().table(&vms, opts)
}

/// Decimal with a `,` between each group of three digits.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Foreground color for a power state cell; unknown states stay plain.
pub fn power_state_style(value: &str) -> &'static str {
    match PowerState::from(value) {
        PowerState::PoweredOff => "Fr",
        PowerState::PoweredOn => "Fg",
        PowerState::Suspended => "Fy",
        PowerState::Other(_) => "",
    }
}

#[cfg(test)]
mod test {
    use prettytable::Cell;

    use super::*;

    struct Inventory(Vec<VmSummary>);

    impl VmService for Inventory {
        fn list_vms(&self) -> Result<Vec<VmSummary>, Error> {
            Ok(self.0.clone())
        }
    }

    struct Unreachable;

    impl VmService for Unreachable {
        fn list_vms(&self) -> Result<Vec<VmSummary>, Error> {
            Err("connection refused".into())
        }
    }

    fn vm(id: &str, name: &str, state: &str, memory: u64) -> VmSummary {
        VmSummary {
            vm: id.to_string(),
            name: name.to_string(),
            power_state: PowerState::from(state),
            cpu_count: Some(2),
            memory_size_mib: Some(memory),
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1024), "1,024");
        assert_eq!(format_number(100), "100");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999_999), "999,999");
    }

    #[test]
    fn test_power_state_colors() {
        assert_eq!(power_state_style("POWERED_ON"), "Fg");
        assert_eq!(power_state_style("POWERED_OFF"), "Fr");
        assert_eq!(power_state_style("SUSPENDED"), "Fy");
        assert_eq!(power_state_style("BOOTING"), "");
    }

    #[test]
    fn test_sorted_by_name() {
        let inv = Inventory(vec![
            vm("vm-2", "beta", "POWERED_ON", 1024),
            vm("vm-1", "alpha", "POWERED_OFF", 2048),
            vm("vm-3", "gamma", "SUSPENDED", 512),
        ]);

        let rows = listing().rows(&inv.list_vms().unwrap(), &ListOptions::default()).unwrap();
        let names: Vec<_> = rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(names, ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_render() {
        let inv = Inventory(vec![
            vm("vm-2", "beta", "POWERED_ON", 1024),
            vm("vm-1", "alpha", "POWERED_OFF", 1234567),
            vm("vm-3", "gamma", "BOOTING", 512),
        ]);

        let table = render(&inv, &ListOptions::default()).unwrap();
        assert_eq!(table.len(), 3);

        let alpha = table.get_row(0).unwrap();
        assert_eq!(alpha.get_cell(0).unwrap().get_content(), "vm-1");
        assert_eq!(*alpha.get_cell(2).unwrap(), Cell::new("POWERED_OFF").style_spec("Fr"));
        assert_eq!(alpha.get_cell(4).unwrap().get_content(), "1,234,567");

        let beta = table.get_row(1).unwrap();
        assert_eq!(*beta.get_cell(2).unwrap(), Cell::new("POWERED_ON").style_spec("Fg"));
        assert_eq!(beta.get_cell(4).unwrap().get_content(), "1,024");

        let gamma = table.get_row(2).unwrap();
        assert_eq!(gamma.get_cell(2).unwrap().get_content(), "BOOTING");

        let out = table.to_string();
        eprintln!("{}", out);

        let header = out.lines().find(|l| !l.trim().is_empty()).unwrap();
        assert!(header.contains("Power State"));
        assert!(header.trim_end().ends_with("RAM Size (MiB)"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn test_sort_by_memory() {
        let inv = Inventory(vec![
            vm("vm-1", "alpha", "POWERED_ON", 16384),
            vm("vm-2", "beta", "POWERED_ON", 512),
            vm("vm-3", "gamma", "POWERED_ON", 2048),
        ]);
        let opts = ListOptions {
            sort_by: Some("memory_size_mib".to_string()),
            ..Default::default()
        };

        let table = render(&inv, &opts).unwrap();
        let sizes: Vec<_> = (0..table.len())
            .map(|i| table.get_row(i).unwrap().get_cell(4).unwrap().get_content())
            .collect();
        assert_eq!(sizes, ["512", "2,048", "16,384"]);
    }

    #[test]
    fn test_fetch_error_propagates() {
        let e = render(&Unreachable, &ListOptions::default()).err().unwrap();
        assert_eq!(e.to_string(), "connection refused");
    }
}
