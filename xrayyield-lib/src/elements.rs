//! Element symbols indexed by atomic number.

const SYMBOLS: [&str; 107] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh",
];

/// Highest atomic number known to the symbol table.
pub const MAX_ATOMIC_NUMBER: u16 = SYMBOLS.len() as u16;

/// Returns the element symbol for `z`, or `None` outside `1..=107`.
pub fn symbol(z: u16) -> Option<&'static str> {
    if z == 0 {
        return None;
    }
    SYMBOLS.get(usize::from(z) - 1).copied()
}

/// Resolves an element symbol (exact case) to its atomic number.
///
/// `D` (deuterium) resolves to hydrogen.
pub fn atomic_number(sym: &str) -> Option<u16> {
    if sym == "D" {
        return Some(1);
    }
    SYMBOLS
        .iter()
        .position(|&s| s == sym)
        .map(|i| i as u16 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(symbol(1), Some("H"));
        assert_eq!(symbol(13), Some("Al"));
        assert_eq!(symbol(83), Some("Bi"));
        assert_eq!(symbol(0), None);
        assert_eq!(symbol(MAX_ATOMIC_NUMBER + 1), None);
    }

    #[test]
    fn test_atomic_number_lookup() {
        assert_eq!(atomic_number("Fe"), Some(26));
        assert_eq!(atomic_number("Te"), Some(52));
        assert_eq!(atomic_number("D"), Some(1));
        assert_eq!(atomic_number("fe"), None);
        assert_eq!(atomic_number("Xx"), None);
    }

    #[test]
    fn test_table_round_trips() {
        for z in 1..=MAX_ATOMIC_NUMBER {
            let sym = symbol(z).unwrap();
            assert_eq!(atomic_number(sym), Some(z));
        }
    }
}
