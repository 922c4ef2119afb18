//! Built-in South African province table.

use stonemart_core::{CityConfig, ProvinceConfig, TaxonomyFile, TownConfig};

struct ProvinceSeed {
    name: &'static str,
    abbreviations: &'static [&'static str],
    lat: f64,
    lng: f64,
    cities: &'static [CitySeed],
}

struct CitySeed {
    name: &'static str,
    lat: f64,
    lng: f64,
    towns: &'static [&'static str],
}

const PROVINCES: &[ProvinceSeed] = &[
    ProvinceSeed {
        name: "Gauteng",
        abbreviations: &["GP"],
        lat: -26.270_8,
        lng: 28.112_3,
        cities: &[
            CitySeed {
                name: "Johannesburg",
                lat: -26.204_1,
                lng: 28.047_3,
                towns: &["Sandton", "Soweto", "Randburg", "Roodepoort", "Midrand"],
            },
            CitySeed {
                name: "Pretoria",
                lat: -25.747_9,
                lng: 28.229_3,
                towns: &["Centurion", "Hatfield", "Mamelodi"],
            },
            CitySeed {
                name: "Ekurhuleni",
                lat: -26.149_6,
                lng: 28.326_3,
                towns: &["Germiston", "Benoni", "Boksburg", "Kempton Park"],
            },
        ],
    },
    ProvinceSeed {
        name: "Western Cape",
        abbreviations: &["WC"],
        lat: -33.227_8,
        lng: 21.856_9,
        cities: &[
            CitySeed {
                name: "Cape Town",
                lat: -33.924_9,
                lng: 18.424_1,
                towns: &["Bellville", "Wynberg", "Milnerton", "Mitchells Plain"],
            },
            CitySeed {
                name: "Stellenbosch",
                lat: -33.932_1,
                lng: 18.860_2,
                towns: &["Paarl", "Franschhoek"],
            },
            CitySeed {
                name: "George",
                lat: -33.963_0,
                lng: 22.461_7,
                towns: &["Knysna", "Mossel Bay"],
            },
        ],
    },
    ProvinceSeed {
        name: "Eastern Cape",
        abbreviations: &["EC"],
        lat: -32.296_8,
        lng: 26.419_4,
        cities: &[
            CitySeed {
                name: "Gqeberha",
                lat: -33.960_8,
                lng: 25.602_2,
                towns: &["Kariega", "Despatch"],
            },
            CitySeed {
                name: "East London",
                lat: -33.029_2,
                lng: 27.854_6,
                towns: &["Mdantsane"],
            },
            CitySeed {
                name: "Mthatha",
                lat: -31.588_9,
                lng: 28.784_4,
                towns: &[],
            },
        ],
    },
    ProvinceSeed {
        name: "KwaZulu-Natal",
        abbreviations: &["KZN", "KwaZulu Natal"],
        lat: -28.530_6,
        lng: 30.895_8,
        cities: &[
            CitySeed {
                name: "Durban",
                lat: -29.858_7,
                lng: 31.021_8,
                towns: &["Umhlanga", "Pinetown", "Chatsworth"],
            },
            CitySeed {
                name: "Pietermaritzburg",
                lat: -29.600_6,
                lng: 30.379_4,
                towns: &["Howick"],
            },
            CitySeed {
                name: "Richards Bay",
                lat: -28.780_7,
                lng: 32.038_3,
                towns: &["Empangeni"],
            },
        ],
    },
    ProvinceSeed {
        name: "Free State",
        abbreviations: &["FS"],
        lat: -28.454_1,
        lng: 26.796_8,
        cities: &[
            CitySeed {
                name: "Bloemfontein",
                lat: -29.085_2,
                lng: 26.159_6,
                towns: &["Botshabelo"],
            },
            CitySeed {
                name: "Welkom",
                lat: -27.977_4,
                lng: 26.735_1,
                towns: &["Virginia"],
            },
        ],
    },
    ProvinceSeed {
        name: "Limpopo",
        abbreviations: &["LP", "LIM"],
        lat: -23.401_3,
        lng: 29.417_9,
        cities: &[
            CitySeed {
                name: "Polokwane",
                lat: -23.904_5,
                lng: 29.468_9,
                towns: &["Seshego"],
            },
            CitySeed {
                name: "Thohoyandou",
                lat: -22.945_6,
                lng: 30.485_0,
                towns: &[],
            },
        ],
    },
    ProvinceSeed {
        name: "Mpumalanga",
        abbreviations: &["MP"],
        lat: -25.565_3,
        lng: 30.527_9,
        cities: &[
            CitySeed {
                name: "Mbombela",
                lat: -25.465_8,
                lng: 30.985_3,
                towns: &["White River", "Nelspruit"],
            },
            CitySeed {
                name: "Emalahleni",
                lat: -25.871_3,
                lng: 29.233_2,
                towns: &["Middelburg"],
            },
            CitySeed {
                name: "Secunda",
                lat: -26.550_4,
                lng: 29.178_1,
                towns: &[],
            },
        ],
    },
    ProvinceSeed {
        name: "North West",
        abbreviations: &["NW"],
        lat: -26.663_9,
        lng: 25.283_8,
        cities: &[
            CitySeed {
                name: "Rustenburg",
                lat: -25.667_6,
                lng: 27.242_1,
                towns: &[],
            },
            CitySeed {
                name: "Mahikeng",
                lat: -25.856_0,
                lng: 25.640_3,
                towns: &[],
            },
            CitySeed {
                name: "Potchefstroom",
                lat: -26.714_5,
                lng: 27.097_0,
                towns: &["Klerksdorp"],
            },
        ],
    },
    ProvinceSeed {
        name: "Northern Cape",
        abbreviations: &["NC"],
        lat: -29.046_7,
        lng: 21.856_9,
        cities: &[
            CitySeed {
                name: "Kimberley",
                lat: -28.728_2,
                lng: 24.749_9,
                towns: &[],
            },
            CitySeed {
                name: "Upington",
                lat: -28.447_8,
                lng: 21.256_1,
                towns: &[],
            },
        ],
    },
];

/// The nine South African provinces with principal cities and towns.
pub(crate) fn south_africa() -> TaxonomyFile {
    TaxonomyFile {
        provinces: PROVINCES
            .iter()
            .map(|p| ProvinceConfig {
                name: p.name.to_string(),
                abbreviations: p.abbreviations.iter().map(ToString::to_string).collect(),
                lat: Some(p.lat),
                lng: Some(p.lng),
                cities: p
                    .cities
                    .iter()
                    .map(|c| CityConfig {
                        name: c.name.to_string(),
                        lat: Some(c.lat),
                        lng: Some(c.lng),
                        towns: c
                            .towns
                            .iter()
                            .map(|t| TownConfig {
                                name: (*t).to_string(),
                                lat: None,
                                lng: None,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}
