use crate::datastreams::{Datastreams, Sensor};
use crate::protocols::thw::parser::ThwFrame;
use crate::Observation;

pub(crate) fn route_observations(
    dev_id: &str,
    frame: &ThwFrame,
    datastreams: &Datastreams,
) -> Vec<Observation> {
    datastreams
        .sensors(dev_id)
        .map(|(sensor, url)| Observation {
            sensor,
            url: url.to_string(),
            result: sensor_result(sensor, frame),
        })
        .collect()
}

fn sensor_result(sensor: Sensor, frame: &ThwFrame) -> f64 {
    match sensor {
        Sensor::Humidity => f64::from(frame.humidity),
        Sensor::Temperature => frame.temperature(),
        Sensor::Windspeed => frame.windspeed_routed(),
    }
}
